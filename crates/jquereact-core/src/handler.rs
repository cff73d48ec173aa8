//! Event handler expressions.

use std::ops::Range;

use jquereact_markup::{css_property_key, dedent};

use crate::chain::find_chains;
use crate::layout::{block, hanging};
use crate::scan::{string_literal, Scanner};

/// Name bound to the matched child element in delegated handlers.
pub const DELEGATE_TARGET: &str = "delegateTarget";

/// A handler argument as written.
#[derive(Debug, Clone, PartialEq)]
pub enum Handler {
    /// `function (params) { body }`; `body` excludes the braces
    Function { params: Vec<String>, body: String },

    /// An arrow function
    Arrow(String),

    /// Any other expression, usually a function name
    Reference(String),
}

/// A converted handler: an arrow function expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub code: String,

    /// False when the conversion may not preserve behavior
    pub exact: bool,
}

impl Handler {
    /// Classify a handler expression.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let scanner = Scanner::new(text);

        if scanner
            .identifier_at(0)
            .is_some_and(|ident| scanner.text(ident) == "function")
        {
            if let Some(handler) = parse_function(&scanner) {
                return handler;
            }
        }

        let is_arrow = text
            .match_indices("=>")
            .any(|(i, _)| scanner.is_code(i) && depth_before(&scanner, i) == 0);
        if is_arrow {
            Self::Arrow(text.to_string())
        } else {
            Self::Reference(text.to_string())
        }
    }

    /// Name of the event parameter, `event` when the handler declares none.
    pub fn event_param(&self) -> String {
        match self {
            Self::Function { params, .. } => params
                .first()
                .cloned()
                .unwrap_or_else(|| "event".to_string()),
            _ => "event".to_string(),
        }
    }

    fn params(&self) -> String {
        match self {
            Self::Function { params, .. } if !params.is_empty() => params.join(", "),
            _ => "event".to_string(),
        }
    }

    /// Handler attached directly to the element; `this` becomes `event.currentTarget`.
    pub fn to_direct(&self) -> Converted {
        match self {
            Self::Function { body, .. } => {
                let target = format!("{}.currentTarget", self.event_param());
                Converted {
                    code: format!("({}) => {}", self.params(), block(&replace_this(body, &target))),
                    exact: !uses_arguments(body),
                }
            }
            Self::Arrow(code) => Converted {
                code: hanging(code),
                exact: true,
            },
            Self::Reference(name) => Converted {
                code: format!("(event) => {}.call(event.currentTarget, event)", hanging(name)),
                exact: true,
            },
        }
    }

    /// Handler attached to a container that only fires for children matching `child`.
    pub fn to_delegated(&self, child: &str) -> Converted {
        let event = self.event_param();
        let (inner, exact) = match self {
            Self::Function { body, .. } => (
                dedent(&replace_this(body, DELEGATE_TARGET)),
                !uses_arguments(body),
            ),
            Self::Arrow(code) => (format!("({})({});", hanging(code), event), true),
            Self::Reference(name) => (
                format!("{}.call({}, {});", hanging(name), DELEGATE_TARGET, event),
                true,
            ),
        };

        let statements = format!(
            "const {target} = {event}.target.closest({child});\nif (!{target} || !{event}.currentTarget.contains({target})) {{\n  return;\n}}\n{inner}",
            target = DELEGATE_TARGET,
            event = event,
            child = child,
            inner = inner,
        );

        Converted {
            code: format!("({}) => {}", self.params(), block(&statements)),
            exact,
        }
    }

    /// Plain callback (e.g. a request success handler); `this` is not rebound.
    pub fn to_callback(&self) -> Converted {
        match self {
            Self::Function { params, body } => Converted {
                code: format!("({}) => {}", params.join(", "), block(body)),
                exact: !uses_this(body) && !uses_arguments(body),
            },
            Self::Arrow(code) | Self::Reference(code) => Converted {
                code: hanging(code),
                exact: true,
            },
        }
    }
}

fn parse_function(scanner: &Scanner<'_>) -> Option<Handler> {
    let source = scanner.source();
    let open = (0..scanner.len()).find(|&i| scanner.is_code(i) && scanner.byte(i) == Some(b'('))?;
    let close = scanner.find_closing(open)?;
    let params = scanner
        .split_top_level(open + 1..close, b',')
        .into_iter()
        .map(|r| scanner.text(r).to_string())
        .collect();

    let body_open = scanner.skip_trivia(close + 1);
    if scanner.byte(body_open) != Some(b'{') {
        return None;
    }
    let body_close = scanner.find_closing(body_open)?;
    if body_close != source.len() - 1 {
        return None;
    }

    Some(Handler::Function {
        params,
        body: source[body_open + 1..body_close].to_string(),
    })
}

fn depth_before(scanner: &Scanner<'_>, at: usize) -> usize {
    let mut depth = 0usize;
    for i in 0..at {
        if !scanner.is_code(i) {
            continue;
        }
        match scanner.byte(i) {
            Some(b'(' | b'[' | b'{') => depth += 1,
            Some(b')' | b']' | b'}') => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

fn uses_this(body: &str) -> bool {
    !bound_this(&Scanner::new(body)).is_empty()
}

fn uses_arguments(body: &str) -> bool {
    !Scanner::new(body).keyword_positions("arguments").is_empty()
}

/// Bodies of `function` expressions nested in `scanner`'s source, braces included.
///
/// Each of these binds its own `this`.
fn nested_function_bodies(scanner: &Scanner<'_>) -> Vec<Range<usize>> {
    scanner
        .keyword_positions("function")
        .into_iter()
        .filter_map(|at| {
            let open = (at..scanner.len())
                .find(|&i| scanner.is_code(i) && scanner.byte(i) == Some(b'('))?;
            let close = scanner.find_closing(open)?;
            let body_open = scanner.skip_trivia(close + 1);
            if scanner.byte(body_open) != Some(b'{') {
                return None;
            }
            let body_close = scanner.find_closing(body_open)?;
            Some(body_open..body_close + 1)
        })
        .collect()
}

/// Positions of `this` that refer to the handler's own receiver.
fn bound_this(scanner: &Scanner<'_>) -> Vec<usize> {
    let nested = nested_function_bodies(scanner);
    scanner
        .keyword_positions("this")
        .into_iter()
        .filter(|at| !nested.iter().any(|body| body.contains(at)))
        .collect()
}

/// Replace each `this` bound to the handler with `target`.
///
/// `this` inside nested `function` bodies is left alone; arrow functions share
/// the handler's receiver and are rewritten.
pub fn replace_this(body: &str, target: &str) -> String {
    let edits: Vec<(Range<usize>, String)> = bound_this(&Scanner::new(body))
        .into_iter()
        .map(|at| (at..at + 4, target.to_string()))
        .collect();
    replace_spans(body, &edits)
}

/// Apply non-overlapping replacements given in source order.
pub fn replace_spans(text: &str, edits: &[(Range<usize>, String)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (range, replacement) in edits {
        if range.start < cursor {
            continue;
        }
        out.push_str(&text[cursor..range.start]);
        out.push_str(replacement);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// A `$(this)` mutation inside a handler that can become a state update.
#[derive(Debug, Clone, PartialEq)]
pub enum ThisMutation {
    /// `$(this).text(value)`
    Text(String),

    /// `$(this).css('property', value)`, key already in React style form
    Style { key: String, value: String },
}

/// A reducible statement found in a handler body.
#[derive(Debug, Clone, PartialEq)]
pub struct ThisCall {
    pub span: Range<usize>,
    pub mutation: ThisMutation,

    /// The statement ended with `;`
    pub terminated: bool,
}

/// Find `$(this).text(x)` and `$(this).css(k, v)` statements in a handler body.
pub fn this_mutations(body: &str) -> Vec<ThisCall> {
    let scanner = Scanner::new(body);
    let nested = nested_function_bodies(&scanner);
    let mut found: Vec<ThisCall> = Vec::new();

    for chain in find_chains(&scanner) {
        if chain.selector() != "this" || chain.calls.len() != 1 {
            continue;
        }
        if nested.iter().any(|body| body.contains(&chain.span.start)) {
            continue;
        }
        if found.last().is_some_and(|prev| chain.span.start < prev.span.end) {
            continue;
        }

        let call = &chain.calls[0];
        let mutation = match (call.method.as_str(), call.args.as_slice()) {
            ("text", [value]) => ThisMutation::Text(value.clone()),
            ("css", [key, value]) => match string_literal(key) {
                Some(key) => ThisMutation::Style {
                    key: css_property_key(&key),
                    value: value.clone(),
                },
                None => continue,
            },
            _ => continue,
        };

        found.push(ThisCall {
            terminated: body[chain.span.clone()].trim_end().ends_with(';'),
            span: chain.span,
            mutation,
        });
    }

    found
}
