//! `value(name)` template expansion.
//!
//! Pure string substitution shared by the processor (local-only lookups) and
//! the transformer (resolver-backed lookups). Replacement is applied
//! recursively so a var can reference another var; a visited-name stack makes
//! cycles terminate with the literal `cyclic value` instead of recursing
//! forever.

use smol_str::SmolStr;

/// The literal a cyclic reference collapses to.
pub const CYCLIC_VALUE: &str = "cyclic value";

/// Callbacks observed during expansion.
pub trait ValueHooks {
    /// Replacement for `name`, or `None` to leave the reference unexpanded.
    fn lookup(&mut self, name: &str) -> Option<String>;
    /// Called for names `lookup` could not provide.
    fn unknown(&mut self, _name: &str) {}
    /// Called with the reference path when a cycle is cut.
    fn cyclic(&mut self, _path: &[SmolStr]) {}
}

pub fn expand_value(text: &str, hooks: &mut dyn ValueHooks) -> String {
    let mut stack = Vec::new();
    expand_with_stack(text, hooks, &mut stack)
}

fn expand_with_stack(text: &str, hooks: &mut dyn ValueHooks, stack: &mut Vec<SmolStr>) -> String {
    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;

    while let Some(found) = text[i..].find("value(") {
        let call_start = i + found;
        // `value` must not be the tail of a longer identifier
        if call_start > 0 && is_ident_byte(bytes[call_start - 1]) {
            out.push_str(&text[i..call_start + 6]);
            i = call_start + 6;
            continue;
        }
        let Some(close) = text[call_start..].find(')') else {
            break;
        };
        let close = call_start + close;
        let name = text[call_start + 6..close].trim();
        if name.is_empty() || !name.chars().all(is_ident_char) {
            out.push_str(&text[i..close + 1]);
            i = close + 1;
            continue;
        }

        out.push_str(&text[i..call_start]);
        let name_key = SmolStr::new(name);
        if stack.contains(&name_key) {
            stack.push(name_key);
            hooks.cyclic(stack);
            stack.pop();
            out.push_str(CYCLIC_VALUE);
        } else if let Some(replacement) = hooks.lookup(name) {
            stack.push(name_key);
            let expanded = expand_with_stack(&replacement, hooks, stack);
            stack.pop();
            out.push_str(&expanded);
        } else {
            hooks.unknown(name);
            out.push_str(&text[call_start..close + 1]);
        }
        i = close + 1;
    }

    out.push_str(&text[i..]);
    out
}

/// All `value(name)` reference names in a text, in order of appearance.
pub fn collect_value_names(text: &str) -> Vec<SmolStr> {
    struct Collect(Vec<SmolStr>);
    impl ValueHooks for Collect {
        fn lookup(&mut self, name: &str) -> Option<String> {
            self.0.push(SmolStr::new(name));
            None
        }
    }
    let mut collect = Collect(Vec::new());
    expand_value(text, &mut collect);
    collect.0
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
}
