//! jQuery event bindings and their React equivalents.

use crate::chain::{object_entries, Call};
use crate::scan::string_literal;

/// jQuery event name -> React event prop.
const REACT_PROPS: &[(&str, &str)] = &[
    ("click", "onClick"),
    ("dblclick", "onDoubleClick"),
    ("contextmenu", "onContextMenu"),
    ("mousedown", "onMouseDown"),
    ("mouseup", "onMouseUp"),
    ("mousemove", "onMouseMove"),
    ("mouseover", "onMouseOver"),
    ("mouseout", "onMouseOut"),
    ("mouseenter", "onMouseEnter"),
    ("mouseleave", "onMouseLeave"),
    ("keydown", "onKeyDown"),
    ("keyup", "onKeyUp"),
    ("keypress", "onKeyPress"),
    ("focus", "onFocus"),
    ("blur", "onBlur"),
    ("focusin", "onFocus"),
    ("focusout", "onBlur"),
    ("change", "onChange"),
    ("input", "onInput"),
    ("submit", "onSubmit"),
    ("reset", "onReset"),
    ("select", "onSelect"),
    ("scroll", "onScroll"),
    ("wheel", "onWheel"),
    ("touchstart", "onTouchStart"),
    ("touchmove", "onTouchMove"),
    ("touchend", "onTouchEnd"),
    ("dragstart", "onDragStart"),
    ("dragover", "onDragOver"),
    ("drop", "onDrop"),
    ("load", "onLoad"),
    ("error", "onError"),
];

/// Methods that bind a handler to the event of the same name (`.click(fn)`).
const SHORTHANDS: &[&str] = &[
    "click", "dblclick", "contextmenu", "mousedown", "mouseup", "mousemove", "mouseover",
    "mouseout", "mouseenter", "mouseleave", "keydown", "keyup", "keypress", "focus", "blur",
    "focusin", "focusout", "change", "submit", "select", "scroll", "resize",
];

/// React prop for a jQuery event name.
pub fn react_prop(event: &str) -> Option<&'static str> {
    REACT_PROPS
        .iter()
        .find(|(name, _)| *name == event)
        .map(|(_, prop)| *prop)
}

pub fn is_shorthand(method: &str) -> bool {
    SHORTHANDS.contains(&method)
}

/// Event names in a jQuery events string, namespaces stripped.
///
/// `"click.menu keyup"` yields `["click", "keyup"]`.
pub fn event_names(events: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in events
        .split_whitespace()
        .filter_map(|e| e.split('.').next())
        .filter(|e| !e.is_empty())
    {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// One handler bound to one or more events.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub events: Vec<String>,

    /// Handler expression as written
    pub handler: String,

    /// Child selector expression for delegated bindings
    pub delegate: Option<String>,

    /// Bound with `.one()`
    pub once: bool,

    /// An `event.data` argument was supplied and cannot be carried over
    pub data_dropped: bool,
}

impl Binding {
    fn new(events: Vec<String>, handler: &str) -> Self {
        Self {
            events,
            handler: handler.to_string(),
            delegate: None,
            once: false,
            data_dropped: false,
        }
    }
}

/// Bindings made by a call, or `None` if the call binds no handler.
pub fn bindings(call: &Call) -> Option<Vec<Binding>> {
    let args: Vec<&str> = call.args.iter().map(String::as_str).collect();
    let method = call.method.as_str();

    let found = match method {
        "on" | "one" | "bind" => on_bindings(&args, method != "bind")?,
        "delegate" => {
            let (child, events, rest) = match args.as_slice() {
                [child, events, handler] => (child, events, vec![*handler]),
                [child, events, data, handler] => (child, events, vec![*data, *handler]),
                _ => return None,
            };
            let mut binding = Binding::new(names_of(events)?, rest[rest.len() - 1]);
            binding.delegate = Some(child.to_string());
            binding.data_dropped = rest.len() > 1;
            vec![binding]
        }
        "hover" => match args.as_slice() {
            [both] => vec![
                Binding::new(vec!["mouseenter".to_string()], both),
                Binding::new(vec!["mouseleave".to_string()], both),
            ],
            [enter, leave] => vec![
                Binding::new(vec!["mouseenter".to_string()], enter),
                Binding::new(vec!["mouseleave".to_string()], leave),
            ],
            _ => return None,
        },
        m if is_shorthand(m) => match args.as_slice() {
            [handler] => vec![Binding::new(vec![m.to_string()], handler)],
            [_, handler] => {
                let mut binding = Binding::new(vec![m.to_string()], handler);
                binding.data_dropped = true;
                vec![binding]
            }
            _ => return None,
        },
        _ => return None,
    };

    let once = method == "one";
    Some(
        found
            .into_iter()
            .map(|mut b| {
                b.once = once;
                b
            })
            .collect(),
    )
}

fn names_of(events: &str) -> Option<Vec<String>> {
    let names = event_names(&string_literal(events)?);
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

fn on_bindings(args: &[&str], delegation: bool) -> Option<Vec<Binding>> {
    if let Some(entries) = args.first().and_then(|first| object_entries(first)) {
        let child = match args.get(1) {
            Some(child) if delegation && string_literal(child).is_some() => Some(child.to_string()),
            Some(_) => return None,
            None => None,
        };
        return entries
            .into_iter()
            .map(|(events, handler)| {
                let names = event_names(&events);
                if names.is_empty() {
                    return None;
                }
                let mut binding = Binding::new(names, &handler);
                binding.delegate = child.clone();
                Some(binding)
            })
            .collect();
    }

    let binding = match args {
        [events, handler] => Binding::new(names_of(events)?, handler),
        [events, second, handler] if delegation && string_literal(second).is_some() => {
            let mut binding = Binding::new(names_of(events)?, handler);
            binding.delegate = Some(second.to_string());
            binding
        }
        [events, second, handler] => {
            let mut binding = Binding::new(names_of(events)?, handler);
            binding.data_dropped = *second != "null";
            binding
        }
        [events, child, _data, handler] if delegation => {
            let mut binding = Binding::new(names_of(events)?, handler);
            binding.delegate = Some(child.to_string());
            binding.data_dropped = true;
            binding
        }
        _ => return None,
    };
    Some(vec![binding])
}
