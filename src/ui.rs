use anyhow::{Result, anyhow};
use console::{Key, Term, style};
use dialoguer::Input;

pub enum Selection {
    Leave,
    Open(usize),
}

pub fn show_status(header: Option<&str>, status: &str) {
    let term = Term::stdout();
    let _ = term.clear_screen();
    if let Some(h) = header {
        println!("{}", h);
    }
    println!("{}", style(status).dim());
}

pub fn show_message(header: Option<&str>, message: &str) -> Result<()> {
    let term = Term::stdout();
    let _ = term.clear_screen();
    if let Some(h) = header {
        println!("{}", h);
    }
    println!("{}", message);
    println!();
    println!("Press any key to exit.");
    term.read_key()?;
    Ok(())
}

pub fn select(prompt: &str, labels: &[String], header: Option<&str>) -> Result<Selection> {
    let term = Term::stdout();
    let mut sel: usize = 0;
    let mut top: usize = 0;
    loop {
        term.clear_screen()?;
        if let Some(h) = header {
            println!("{}", h);
        }
        println!("{}", prompt);

        let (rows, _cols) = term.size();
        let reserved = 2 + usize::from(header.is_some());
        let visible = (rows as usize).saturating_sub(reserved).max(3).min(labels.len());
        top = scroll_top(sel, top, visible);

        for (i, label) in labels.iter().enumerate().skip(top).take(visible) {
            if i == sel {
                println!("{} {}: {}", style(">").cyan().bold(), i + 1, label);
            } else {
                println!("  {}: {}", i + 1, label);
            }
        }
        println!("Arrows + Enter to open, or type a number. 'q' = quit.");

        let step = visible.saturating_sub(1).max(1);
        let last = labels.len().saturating_sub(1);
        match term.read_key()? {
            Key::ArrowUp => sel = sel.saturating_sub(1),
            Key::ArrowDown => sel = (sel + 1).min(last),
            Key::Home => sel = 0,
            Key::End => sel = last,
            Key::PageUp => sel = sel.saturating_sub(step),
            Key::PageDown => sel = (sel + step).min(last),
            Key::Enter => return Ok(Selection::Open(sel)),
            Key::Escape | Key::Char('q') | Key::Char('Q') | Key::Char('b') | Key::Char('B') => {
                return Ok(Selection::Leave);
            }
            Key::Char(c) if c.is_ascii_digit() => {
                let typed: String = Input::new()
                    .with_prompt("Open")
                    .with_initial_text(c.to_string())
                    .allow_empty(true)
                    .interact_text()?;
                match parse_selection(&typed, labels.len()) {
                    Ok(choice) => return Ok(choice),
                    Err(_) => continue,
                }
            }
            _ => {}
        }
    }
}

// keep selection in viewport
fn scroll_top(sel: usize, top: usize, visible: usize) -> usize {
    if visible == 0 || sel < top {
        sel
    } else if sel >= top + visible {
        sel + 1 - visible
    } else {
        top
    }
}

fn parse_selection(input: &str, len: usize) -> Result<Selection> {
    let s = input.trim();
    if s.eq_ignore_ascii_case("q") || s.eq_ignore_ascii_case("b") {
        return Ok(Selection::Leave);
    }
    let idx: usize = s.parse().map_err(|_| anyhow!("invalid selection"))?;
    if idx == 0 || idx > len {
        return Err(anyhow!("out of range"));
    }
    Ok(Selection::Open(idx - 1))
}
