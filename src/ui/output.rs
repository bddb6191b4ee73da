use crate::notify::ChangeKind;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::BOX, text.style(theme().heading.clone()));
}

pub fn banner(title: &str, subtitle: &str) {
    println!();
    println!("{} {}", Icons::ROCKET, title.style(theme().heading.clone()));
    println!("   {}", subtitle.style(theme().faint.clone()));
    println!();
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().ok.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().caution.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().accent.clone()),
        label.style(theme().faint.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().heading.clone()));
}

/// One line per applied mutation
pub fn change(kind: ChangeKind, resource: &str) {
    let icon = match kind {
        ChangeKind::Inserted => Icons::NEW,
        ChangeKind::Updated => Icons::MOD,
        ChangeKind::Deleted => Icons::DEL,
    };
    println!("{} {}", icon.style(theme().for_change(kind)), resource);
}
