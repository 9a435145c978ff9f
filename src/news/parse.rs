use super::model::{NO_AUTHOR, Story};
use crate::error::ParseError;
use serde_json::{Map, Value};

const RESPONSE: &str = "response";
const RESULTS: &str = "results";
const WEB_PUBLICATION_DATE: &str = "webPublicationDate";
const WEB_TITLE: &str = "webTitle";
const SECTION_NAME: &str = "sectionName";
const WEB_URL: &str = "webUrl";
const TAGS: &str = "tags";

/// Empty input yields `Ok(None)`, kept apart from a document with no
/// results. Any shape mismatch fails the whole document.
pub fn parse_stories(json: &str) -> Result<Option<Vec<Story>>, ParseError> {
    if json.is_empty() {
        return Ok(None);
    }

    let root: Value = serde_json::from_str(json)?;
    let root = root.as_object().ok_or(ParseError::WrongType {
        field: "(document)",
        expected: "an object",
    })?;
    let response = object_field(root, RESPONSE)?;
    let results = array_field(response, RESULTS)?;

    let mut stories = Vec::with_capacity(results.len());
    for entry in results {
        let story = entry.as_object().ok_or(ParseError::WrongType {
            field: RESULTS,
            expected: "an array of objects",
        })?;
        stories.push(Story::new(
            lenient_string(story, WEB_PUBLICATION_DATE),
            lenient_string(story, WEB_TITLE),
            lenient_string(story, SECTION_NAME),
            lenient_string(story, WEB_URL),
            author(story)?,
        ));
    }
    Ok(Some(stories))
}

fn author(story: &Map<String, Value>) -> Result<String, ParseError> {
    let Some(tags) = story.get(TAGS) else {
        return Ok(NO_AUTHOR.to_string());
    };
    let tags = tags.as_array().ok_or(ParseError::WrongType {
        field: TAGS,
        expected: "an array",
    })?;
    let tag = match tags.first() {
        None | Some(Value::Null) => return Ok(NO_AUTHOR.to_string()),
        Some(tag) => tag.as_object().ok_or(ParseError::WrongType {
            field: TAGS,
            expected: "an array of objects",
        })?,
    };
    // The guard checks the story's own `webTitle` but the value comes from
    // the tag's `webTitle`. Kept as-is: a titleless story shows no byline.
    if !story.contains_key(WEB_TITLE) {
        return Ok(NO_AUTHOR.to_string());
    }
    // An explicit null byline counts as no byline; only a missing key is an error.
    if tag.get(WEB_TITLE).is_some_and(Value::is_null) {
        return Ok(NO_AUTHOR.to_string());
    }
    strict_string(tag, WEB_TITLE)
}

fn object_field<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a Map<String, Value>, ParseError> {
    obj.get(key)
        .ok_or(ParseError::MissingField(key))?
        .as_object()
        .ok_or(ParseError::WrongType {
            field: key,
            expected: "an object",
        })
}

fn array_field<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a Vec<Value>, ParseError> {
    obj.get(key)
        .ok_or(ParseError::MissingField(key))?
        .as_array()
        .ok_or(ParseError::WrongType {
            field: key,
            expected: "an array",
        })
}

// Missing, null and structured values all read as "". Scalars keep their JSON text.
fn lenient_string(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
        _ => String::new(),
    }
}

fn strict_string(obj: &Map<String, Value>, key: &'static str) -> Result<String, ParseError> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(v.to_string()),
        None => Err(ParseError::MissingField(key)),
        Some(_) => Err(ParseError::WrongType {
            field: key,
            expected: "a string",
        }),
    }
}
