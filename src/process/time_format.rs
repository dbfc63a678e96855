use once_cell::sync::Lazy;
use regex::Regex;

/// Anchored at the start like a prefix match: any text on the first line, a
/// space, then `HH:MM:SS`. Whatever follows the seconds is not inspected.
static TIME_COMPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.* \d{2}:\d{2}:\d{2}").expect("time component pattern is valid")
});

/// True when `value` already carries a ` HH:MM:SS` time of day.
///
/// The check is deliberately loose: a time-shaped substring anywhere after a
/// space counts, not only a proper suffix after a date.
pub fn has_time_component(value: &str) -> bool {
    TIME_COMPONENT.is_match(value)
}
