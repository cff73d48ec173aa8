//! Code generation shared by the chain rules.
//!
//! A chain on a literal selector becomes a rendered element: mutations turn into
//! attributes, styles and children, handlers into event props. A chain on a
//! global (`document`, `window`) or a runtime selector becomes an effect that
//! applies the same calls imperatively and cleans up its listeners.

use jquereact_markup::{convert_fragment, css_property_key, jsx_attribute_name};

use crate::chain::{object_entries, Call, Chain};
use crate::events::{bindings, react_prop, Binding};
use crate::handler::{replace_spans, this_mutations, Handler, ThisMutation};
use crate::layout::{block, indent};
use crate::naming::to_pascal_case;
use crate::rules::{classify, reparse_chain, CallKind};
use crate::scan::string_literal;
use crate::selector::{resolve, ElementTarget, Target};
use crate::traits::{CodeFragment, GenerateContext, Match, Requirement, RuleError};

/// Whether a call mutates its element (setter arity only; getters are not mutations).
pub(crate) fn is_mutation(call: &Call) -> bool {
    let n = call.args.len();
    let object_arg = n == 1 && call.args[0].trim_start().starts_with('{');
    match call.method.as_str() {
        "css" | "attr" | "prop" => n == 2 || object_arg,
        "text" | "html" | "val" | "width" | "height" | "addClass" | "removeAttr" => n == 1,
        "removeClass" => n <= 1,
        "append" | "prepend" => n >= 1,
        "empty" => n == 0,
        "show" | "hide" => true,
        _ => false,
    }
}

/// Generate the fragment for a chain match.
pub(crate) fn generate(
    rule: &str,
    m: &Match,
    cx: &mut GenerateContext<'_>,
) -> Result<CodeFragment, RuleError> {
    let chain = reparse_chain(m)?;
    let target = resolve(chain.selector())
        .ok_or_else(|| RuleError::Unsupported(format!("selector {}", chain.selector())))?;

    let mut fragment = CodeFragment::new(rule, m.span.clone());
    match &target {
        Target::Element(el) => ElementBuilder::new(el).build(&chain, cx, &mut fragment),
        Target::Global(global) => {
            let collection = format!("[{}]", global.expression());
            EffectBuilder::new(target.stem(), collection).build(&chain, cx, &mut fragment);
        }
        Target::Expression(expr) => {
            let collection = format!("document.querySelectorAll({})", expr);
            EffectBuilder::new(target.stem(), collection).build(&chain, cx, &mut fragment);
            // The expression may also be an element or a jQuery object
            fragment.approximate();
        }
    }

    Ok(fragment)
}

/// End state of an animation: `Some(true)` visible, `Some(false)` hidden.
fn animation_visibility(method: &str) -> Option<bool> {
    match method {
        "fadeIn" | "slideDown" => Some(true),
        "fadeOut" | "slideUp" => Some(false),
        _ => None,
    }
}

/// A JSX attribute value: a quoted string for plain literals, otherwise an expression.
pub(crate) fn attribute_value(arg: &str) -> String {
    match string_literal(arg) {
        Some(value) if !value.contains('\n') => quoted(&value),
        _ => format!("{{{}}}", arg.trim()),
    }
}

fn quoted(value: &str) -> String {
    if value.contains('"') {
        format!("{{'{}'}}", value.replace('\\', "\\\\").replace('\'', "\\'"))
    } else {
        format!("\"{}\"", value)
    }
}

fn js_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// JSX name for a DOM property set with `.prop()`.
fn prop_name(name: &str) -> String {
    match name {
        "checked" => "defaultChecked".to_string(),
        "value" => "defaultValue".to_string(),
        other => jsx_attribute_name(other),
    }
}

/// Converted HTML for a string literal argument, if it is one.
fn literal_markup(arg: &str) -> Option<String> {
    let html = string_literal(arg)?;
    convert_fragment(&html).ok().filter(|jsx| !jsx.is_empty())
}

struct ElementBuilder {
    tag: String,
    stem: String,

    /// JSX attributes in render order; `None` renders the bare name
    attributes: Vec<(String, Option<String>)>,

    classes: Vec<String>,
    class_exprs: Vec<String>,

    /// Style entries; an empty key holds a spread
    style: Vec<(String, String)>,

    children: Vec<String>,
    inner_html: Option<String>,
    text_initial: Option<String>,

    /// Event prop -> handler names
    handlers: Vec<(String, Vec<String>)>,

    state: Vec<String>,
    handler_setup: Vec<String>,
    text_state: Option<(String, String)>,
    style_state: Option<(String, String)>,
    exact: bool,
}

impl ElementBuilder {
    fn new(target: &ElementTarget) -> Self {
        let mut attributes = Vec::new();
        if let Some(id) = &target.id {
            attributes.push(("id".to_string(), Some(quoted(id))));
        }
        for (name, value) in &target.attributes {
            attributes.push((jsx_attribute_name(name), value.as_deref().map(quoted)));
        }

        Self {
            tag: target.tag.clone(),
            stem: target.stem(),
            attributes,
            classes: target.classes.clone(),
            class_exprs: Vec::new(),
            style: Vec::new(),
            children: Vec::new(),
            inner_html: None,
            text_initial: None,
            handlers: Vec::new(),
            state: Vec::new(),
            handler_setup: Vec::new(),
            text_state: None,
            style_state: None,
            exact: target.exact,
        }
    }

    fn build(mut self, chain: &Chain, cx: &mut GenerateContext<'_>, fragment: &mut CodeFragment) {
        // Static state first so handlers can turn it into React state
        for call in &chain.calls {
            match classify(call) {
                CallKind::Mutation => self.mutate(call),
                CallKind::Animation => {
                    match animation_visibility(&call.method) {
                        Some(true) => self.remove_style("display"),
                        Some(false) => self.set_style("display", "'none'"),
                        None => {}
                    }
                    self.exact = false;
                }
                _ => {}
            }
        }

        for call in &chain.calls {
            if !matches!(classify(call), CallKind::Event | CallKind::Delegated) {
                continue;
            }
            if !cx.options.handle_events {
                self.exact = false;
                continue;
            }
            for binding in bindings(call).unwrap_or_default() {
                self.bind(&binding, cx);
            }
        }

        fragment.markup = Some(self.render());
        if !self.state.is_empty() {
            fragment.requires.insert(Requirement::UseState);
        }
        fragment.setup.append(&mut self.state);
        fragment.setup.append(&mut self.handler_setup);
        if !self.exact {
            fragment.approximate();
        }
    }

    fn mutate(&mut self, call: &Call) {
        let args: Vec<&str> = call.args.iter().map(String::as_str).collect();
        match (call.method.as_str(), args.as_slice()) {
            ("css", [key, value]) => match string_literal(key) {
                Some(key) => self.set_style(&css_property_key(&key), value),
                None => {
                    self.style.push((format!("[{}]", key), value.to_string()));
                    self.exact = false;
                }
            },
            ("css", [object]) => match object_entries(object) {
                Some(entries) => {
                    for (key, value) in entries {
                        self.set_style(&css_property_key(&key), &value);
                    }
                }
                None => {
                    self.style.push((String::new(), format!("...{}", object)));
                    self.exact = false;
                }
            },
            ("text", [value]) => {
                self.children = vec![format!("{{{}}}", value)];
                self.text_initial = Some(value.to_string());
                self.inner_html = None;
            }
            ("html", [value]) => {
                self.text_initial = None;
                match literal_markup(value) {
                    Some(jsx) => {
                        self.children = vec![jsx];
                        self.inner_html = None;
                    }
                    None => {
                        self.children.clear();
                        self.inner_html = Some(value.to_string());
                        self.exact = false;
                    }
                }
            }
            ("append" | "prepend", items) => {
                self.text_initial = None;
                let mut converted = Vec::new();
                for item in items {
                    match literal_markup(item) {
                        Some(jsx) => converted.push(jsx),
                        None => {
                            converted.push(format!("{{{}}}", item));
                            self.exact = false;
                        }
                    }
                }
                if call.method == "append" {
                    self.children.extend(converted);
                } else {
                    converted.append(&mut self.children);
                    self.children = converted;
                }
            }
            ("empty", []) => {
                self.children.clear();
                self.inner_html = None;
                self.text_initial = None;
            }
            ("addClass", [value]) => match string_literal(value) {
                Some(names) => {
                    for name in names.split_whitespace() {
                        if !self.classes.iter().any(|c| c == name) {
                            self.classes.push(name.to_string());
                        }
                    }
                }
                None => {
                    self.class_exprs.push(value.to_string());
                    self.exact = false;
                }
            },
            ("removeClass", []) => {
                self.classes.clear();
                self.class_exprs.clear();
            }
            ("removeClass", [value]) => match string_literal(value) {
                Some(names) => {
                    let names: Vec<&str> = names.split_whitespace().collect();
                    self.classes.retain(|c| !names.contains(&c.as_str()));
                }
                None => self.exact = false,
            },
            ("attr", [key, value]) => match string_literal(key) {
                Some(key) => self.set_attr(&key, value),
                None => self.exact = false,
            },
            ("prop", [key, value]) => match string_literal(key) {
                Some(key) => self.set_attribute(&prop_name(&key), format!("{{{}}}", value)),
                None => self.exact = false,
            },
            ("attr" | "prop", [object]) => match object_entries(object) {
                Some(entries) => {
                    for (key, value) in entries {
                        if call.method == "attr" {
                            self.set_attr(&key, &value);
                        } else {
                            self.set_attribute(&prop_name(&key), format!("{{{}}}", value));
                        }
                    }
                }
                None => self.exact = false,
            },
            ("removeAttr", [key]) => match string_literal(key) {
                Some(key) => {
                    let name = jsx_attribute_name(&key);
                    if name == "className" {
                        self.classes.clear();
                        self.class_exprs.clear();
                    }
                    self.attributes.retain(|(n, _)| *n != name);
                }
                None => self.exact = false,
            },
            ("val", [value]) => self.set_attribute("defaultValue", format!("{{{}}}", value)),
            ("width" | "height", [value]) => self.set_style(&call.method, value),
            ("show", rest) => {
                self.remove_style("display");
                self.exact &= rest.is_empty();
            }
            ("hide", rest) => {
                self.set_style("display", "'none'");
                self.exact &= rest.is_empty();
            }
            _ => self.exact = false,
        }
    }

    fn set_attr(&mut self, key: &str, value: &str) {
        let name = jsx_attribute_name(key);
        match name.as_str() {
            "className" => match string_literal(value) {
                Some(names) => {
                    self.classes = names.split_whitespace().map(str::to_string).collect();
                    self.class_exprs.clear();
                }
                None => {
                    self.classes.clear();
                    self.class_exprs = vec![value.to_string()];
                }
            },
            "style" => self.exact = false,
            _ => self.set_attribute(&name, attribute_value(value)),
        }
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = Some(value),
            None => self.attributes.push((name.to_string(), Some(value))),
        }
    }

    fn set_style(&mut self, key: &str, value: &str) {
        match self.style.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value.trim().to_string(),
            None => self.style.push((key.to_string(), value.trim().to_string())),
        }
    }

    fn remove_style(&mut self, key: &str) {
        self.style.retain(|(k, _)| k != key);
    }

    fn bind(&mut self, binding: &Binding, cx: &mut GenerateContext<'_>) {
        let handler = Handler::parse(&binding.handler);
        let converted = match &binding.delegate {
            Some(child) => handler.to_delegated(child),
            None => self.reduce(handler, cx).to_direct(),
        };
        if !converted.exact || binding.once || binding.data_dropped {
            self.exact = false;
        }

        let event = binding.events.first().map(String::as_str).unwrap_or("event");
        let name = cx.names.claim(&format!(
            "handle{}{}",
            to_pascal_case(&self.stem),
            to_pascal_case(event)
        ));
        self.handler_setup
            .push(format!("const {} = {};", name, converted.code));

        for event in &binding.events {
            match react_prop(event) {
                Some(prop) => match self.handlers.iter_mut().find(|(p, _)| p == prop) {
                    Some((_, names)) => names.push(name.clone()),
                    None => self.handlers.push((prop.to_string(), vec![name.clone()])),
                },
                None => {
                    self.handler_setup.push(format!(
                        "// '{}' has no React event prop; {} is not attached",
                        event, name
                    ));
                    self.exact = false;
                }
            }
        }
    }

    /// Turn `$(this).text(x)` / `$(this).css(k, v)` statements into state updates.
    fn reduce(&mut self, handler: Handler, cx: &mut GenerateContext<'_>) -> Handler {
        let (params, body) = match handler {
            Handler::Function { params, body } => (params, body),
            other => return other,
        };

        let mut edits = Vec::new();
        for call in this_mutations(&body) {
            let update = match call.mutation {
                ThisMutation::Text(value) => {
                    let (_, setter) = self.text_state(cx);
                    format!("{}({})", setter, value)
                }
                ThisMutation::Style { key, value } => {
                    let (_, setter) = self.style_state(cx);
                    format!("{}((style) => ({{ ...style, {}: {} }}))", setter, key, value)
                }
            };
            let update = if call.terminated {
                format!("{};", update)
            } else {
                update
            };
            edits.push((call.span, update));
        }

        Handler::Function {
            params,
            body: replace_spans(&body, &edits),
        }
    }

    fn text_state(&mut self, cx: &mut GenerateContext<'_>) -> (String, String) {
        if let Some(state) = &self.text_state {
            return state.clone();
        }

        let (value, setter) = cx.names.claim_state(&format!("{}Text", self.stem));
        let initial = self.text_initial.clone().unwrap_or_else(|| "''".to_string());
        self.state.push(format!(
            "const [{}, {}] = useState({});",
            value, setter, initial
        ));
        self.children = vec![format!("{{{}}}", value)];
        self.inner_html = None;
        self.text_state = Some((value.clone(), setter.clone()));
        (value, setter)
    }

    fn style_state(&mut self, cx: &mut GenerateContext<'_>) -> (String, String) {
        if let Some(state) = &self.style_state {
            return state.clone();
        }

        let (value, setter) = cx.names.claim_state(&format!("{}Style", self.stem));
        let initial = self.style_object().unwrap_or_else(|| "{}".to_string());
        self.state.push(format!(
            "const [{}, {}] = useState({});",
            value, setter, initial
        ));
        self.style.clear();
        self.style_state = Some((value.clone(), setter.clone()));
        (value, setter)
    }

    fn style_object(&self) -> Option<String> {
        if self.style.is_empty() {
            return None;
        }
        let entries: Vec<String> = self
            .style
            .iter()
            .map(|(key, value)| {
                if key.is_empty() {
                    value.clone()
                } else {
                    format!("{}: {}", key, value)
                }
            })
            .collect();
        Some(format!("{{ {} }}", entries.join(", ")))
    }

    fn render(&self) -> String {
        let mut attrs: Vec<String> = self
            .attributes
            .iter()
            .map(|(name, value)| match value {
                Some(value) => format!("{}={}", name, value),
                None => name.clone(),
            })
            .collect();

        if !self.class_exprs.is_empty() {
            let items: Vec<String> = self
                .classes
                .iter()
                .map(|c| js_string(c))
                .chain(self.class_exprs.iter().cloned())
                .collect();
            attrs.push(format!("className={{[{}].join(' ')}}", items.join(", ")));
        } else if !self.classes.is_empty() {
            attrs.push(format!("className={}", quoted(&self.classes.join(" "))));
        }

        if let Some((value, _)) = &self.style_state {
            attrs.push(format!("style={{{}}}", value));
        } else if let Some(object) = self.style_object() {
            attrs.push(format!("style={{{}}}", object));
        }

        if let Some(html) = &self.inner_html {
            attrs.push(format!("dangerouslySetInnerHTML={{{{ __html: {} }}}}", html));
        }

        for (prop, names) in &self.handlers {
            if let [name] = names.as_slice() {
                attrs.push(format!("{}={{{}}}", prop, name));
            } else {
                let calls: Vec<String> = names.iter().map(|n| format!("{}(event);", n)).collect();
                attrs.push(format!("{}={{(event) => {{ {} }}}}", prop, calls.join(" ")));
            }
        }

        let open = if attrs.is_empty() {
            format!("<{}", self.tag)
        } else {
            format!("<{} {}", self.tag, attrs.join(" "))
        };

        if self.children.is_empty() || self.inner_html.is_some() {
            return format!("{} />", open);
        }

        let inline = self.children.iter().all(|c| !c.contains('\n'))
            && self.children.iter().map(String::len).sum::<usize>() <= 60;
        if inline {
            format!("{}>{}</{}>", open, self.children.join(""), self.tag)
        } else {
            format!(
                "{}>\n{}\n</{}>",
                open,
                indent(&self.children.join("\n"), 2),
                self.tag
            )
        }
    }
}

/// Builds a `useEffect` that applies a chain to elements found at runtime.
struct EffectBuilder {
    stem: String,
    collection: String,
    statements: Vec<String>,
    handler_setup: Vec<String>,

    /// (event, handler name, once)
    listeners: Vec<(String, String, bool)>,

    exact: bool,
}

impl EffectBuilder {
    fn new(stem: String, collection: String) -> Self {
        Self {
            stem,
            collection,
            statements: Vec::new(),
            handler_setup: Vec::new(),
            listeners: Vec::new(),
            exact: true,
        }
    }

    fn build(mut self, chain: &Chain, cx: &mut GenerateContext<'_>, fragment: &mut CodeFragment) {
        for call in &chain.calls {
            match classify(call) {
                CallKind::Mutation => self.mutate(call),
                CallKind::Animation => {
                    match animation_visibility(&call.method) {
                        Some(true) => self.statements.push("element.style.display = '';".to_string()),
                        Some(false) => self
                            .statements
                            .push("element.style.display = 'none';".to_string()),
                        None => {}
                    }
                    self.exact = false;
                }
                CallKind::Event | CallKind::Delegated if cx.options.handle_events => {
                    for binding in bindings(call).unwrap_or_default() {
                        self.bind(&binding, cx);
                    }
                }
                CallKind::Event | CallKind::Delegated => self.exact = false,
                CallKind::Unknown => self.exact = false,
            }
        }

        fragment.setup.push(self.render());
        fragment.requires.insert(Requirement::UseEffect);
        if !self.exact {
            fragment.approximate();
        }
    }

    fn mutate(&mut self, call: &Call) {
        let args: Vec<&str> = call.args.iter().map(String::as_str).collect();
        let statement = match (call.method.as_str(), args.as_slice()) {
            ("css", [key, value]) => match string_literal(key) {
                Some(name) if !name.starts_with("--") => {
                    format!("element.style.{} = {};", css_property_key(&name), value)
                }
                Some(_) => format!("element.style.setProperty({}, {});", key, value),
                None => {
                    self.exact = false;
                    format!("element.style.setProperty({}, {});", key, value)
                }
            },
            ("css", [object]) => format!("Object.assign(element.style, {});", object),
            ("text", [value]) => format!("element.textContent = {};", value),
            ("html", [value]) => format!("element.innerHTML = {};", value),
            ("append" | "prepend", items) => {
                let position = if call.method == "append" { "beforeend" } else { "afterbegin" };
                if items.iter().any(|item| string_literal(item).is_none()) {
                    self.exact = false;
                }
                let ordered: Vec<&&str> = if call.method == "append" {
                    items.iter().collect()
                } else {
                    items.iter().rev().collect()
                };
                ordered
                    .into_iter()
                    .map(|item| format!("element.insertAdjacentHTML('{}', {});", position, item))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            ("empty", []) => "element.replaceChildren();".to_string(),
            ("addClass" | "removeClass", [value]) => {
                let action = if call.method == "addClass" { "add" } else { "remove" };
                match string_literal(value) {
                    Some(names) => {
                        let names: Vec<String> = names.split_whitespace().map(js_string).collect();
                        format!("element.classList.{}({});", action, names.join(", "))
                    }
                    None => {
                        self.exact = false;
                        format!("element.classList.{}(...String({}).split(' '));", action, value)
                    }
                }
            }
            ("removeClass", []) => "element.className = '';".to_string(),
            ("attr", [key, value]) => format!("element.setAttribute({}, {});", key, value),
            ("attr", [object]) => match object_entries(object) {
                Some(entries) => entries
                    .iter()
                    .map(|(key, value)| format!("element.setAttribute({}, {});", js_string(key), value))
                    .collect::<Vec<_>>()
                    .join("\n"),
                None => {
                    self.exact = false;
                    return;
                }
            },
            ("prop", [key, value]) => match string_literal(key) {
                Some(name) if name.bytes().all(crate::scan::is_ident_char) => {
                    format!("element.{} = {};", name, value)
                }
                _ => format!("element[{}] = {};", key, value),
            },
            ("prop", [object]) => format!("Object.assign(element, {});", object),
            ("removeAttr", [key]) => format!("element.removeAttribute({});", key),
            ("val", [value]) => format!("element.value = {};", value),
            ("width" | "height", [value]) => {
                if value.parse::<f64>().is_ok() {
                    format!("element.style.{} = '{}px';", call.method, value)
                } else {
                    format!("element.style.{} = {};", call.method, value)
                }
            }
            ("show", rest) => {
                self.exact &= rest.is_empty();
                "element.style.display = '';".to_string()
            }
            ("hide", rest) => {
                self.exact &= rest.is_empty();
                "element.style.display = 'none';".to_string()
            }
            _ => {
                self.exact = false;
                return;
            }
        };
        self.statements.push(statement);
    }

    fn bind(&mut self, binding: &Binding, cx: &mut GenerateContext<'_>) {
        let handler = Handler::parse(&binding.handler);
        let converted = match &binding.delegate {
            Some(child) => handler.to_delegated(child),
            None => handler.to_direct(),
        };
        if !converted.exact || binding.data_dropped {
            self.exact = false;
        }

        let event = binding.events.first().map(String::as_str).unwrap_or("event");
        let name = cx.names.claim(&format!(
            "handle{}{}",
            to_pascal_case(&self.stem),
            to_pascal_case(event)
        ));
        self.handler_setup
            .push(format!("const {} = {};", name, converted.code));
        for event in &binding.events {
            self.listeners
                .push((event.clone(), name.clone(), binding.once));
        }
    }

    fn render(&self) -> String {
        let mut body = vec![format!("const elements = {};", self.collection)];

        if !self.statements.is_empty() {
            body.push(format!(
                "elements.forEach((element) => {});",
                block(&self.statements.join("\n"))
            ));
        }

        body.extend(self.handler_setup.iter().cloned());

        if !self.listeners.is_empty() {
            let add: Vec<String> = self
                .listeners
                .iter()
                .map(|(event, name, once)| {
                    let options = if *once { ", { once: true }" } else { "" };
                    format!(
                        "elements.forEach((element) => element.addEventListener('{}', {}{}));",
                        event, name, options
                    )
                })
                .collect();
            let remove: Vec<String> = self
                .listeners
                .iter()
                .map(|(event, name, _)| {
                    format!(
                        "elements.forEach((element) => element.removeEventListener('{}', {}));",
                        event, name
                    )
                })
                .collect();
            body.extend(add);
            body.push(format!("return () => {};", block(&remove.join("\n"))));
        }

        format!("useEffect(() => {}, []);", block(&body.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TransformOptions;
    use pretty_assertions::assert_eq;

    fn run(source: &str, options: &TransformOptions) -> CodeFragment {
        let m = Match::new("test", source, 0..source.len());
        let mut cx = GenerateContext::new(options);
        generate("test", &m, &mut cx).unwrap()
    }

    #[test]
    fn renders_mutations_as_element() {
        let fragment = run(
            "$('div.greeting').css('color', 'red').text('Hello').addClass('big');",
            &TransformOptions::default(),
        );

        assert_eq!(
            fragment.markup.as_deref(),
            Some(r#"<div className="greeting big" style={{ color: 'red' }}>{'Hello'}</div>"#)
        );
        assert!(fragment.setup.is_empty());
        assert_eq!(fragment.confidence, crate::traits::Confidence::Exact);
    }

    #[test]
    fn reduces_this_mutations_to_state() {
        let fragment = run(
            "$('#title').text('Hi').on('click', function () {\n  $(this).text('Clicked');\n});",
            &TransformOptions::default(),
        );

        assert_eq!(
            fragment.setup,
            vec![
                "const [titleText, setTitleText] = useState('Hi');".to_string(),
                "const handleTitleClick = (event) => {\n  setTitleText('Clicked');\n};".to_string(),
            ]
        );
        assert_eq!(
            fragment.markup.as_deref(),
            Some(r#"<div id="title" onClick={handleTitleClick}>{titleText}</div>"#)
        );
        assert!(fragment.requires.contains(&Requirement::UseState));
    }

    #[test]
    fn nested_function_this_is_not_rebound() {
        let fragment = run(
            "$('#a').on('click', function () {\n  items.forEach(function () { this.hidden = true; });\n  $(this).text('y');\n});",
            &TransformOptions::default(),
        );

        let handler = fragment.setup.last().unwrap();
        assert!(handler.contains("items.forEach(function () { this.hidden = true; });"));
        assert!(handler.contains("setAText('y');"));
        assert!(!handler.contains("currentTarget.hidden"));
    }

    #[test]
    fn style_updates_use_functional_state() {
        let fragment = run(
            "$('.box').css('color', 'red').hover(function () { $(this).css('color', 'blue'); });",
            &TransformOptions::default(),
        );

        assert_eq!(fragment.setup[0], "const [boxStyle, setBoxStyle] = useState({ color: 'red' });");
        assert!(fragment.setup[1].contains("setBoxStyle((style) => ({ ...style, color: 'blue' }));"));
        let markup = fragment.markup.unwrap();
        assert!(markup.contains("style={boxStyle}"));
        assert!(markup.contains("onMouseEnter={handleBoxMouseenter}"));
        assert!(markup.contains("onMouseLeave={handleBoxMouseleave}"));
    }

    #[test]
    fn appended_html_is_converted() {
        let fragment = run(
            "$('ul.list').append('<li class=\"item\">One</li>');",
            &TransformOptions::default(),
        );

        assert_eq!(
            fragment.markup.as_deref(),
            Some(r#"<ul className="list"><li className="item">One</li></ul>"#)
        );
    }

    #[test]
    fn animations_keep_end_state_only() {
        let fragment = run("$('#panel').hide().fadeIn(400);", &TransformOptions::default());

        assert_eq!(fragment.markup.as_deref(), Some(r#"<div id="panel" />"#));
        assert_eq!(fragment.confidence, crate::traits::Confidence::Approximate);
    }

    #[test]
    fn disabled_events_are_dropped() {
        let options = TransformOptions::default().with_events(false);
        let fragment = run("$('#a').text('x').click(go);", &options);

        assert_eq!(fragment.markup.as_deref(), Some(r#"<div id="a">{'x'}</div>"#));
        assert!(fragment.setup.is_empty());
        assert_eq!(fragment.confidence, crate::traits::Confidence::Approximate);
    }

    #[test]
    fn global_targets_use_native_listeners() {
        let fragment = run("$(document).on('keyup', onKey);", &TransformOptions::default());

        assert_eq!(
            fragment.setup,
            vec![[
                "useEffect(() => {",
                "  const elements = [document];",
                "  const handleDocumentKeyup = (event) => onKey.call(event.currentTarget, event);",
                "  elements.forEach((element) => element.addEventListener('keyup', handleDocumentKeyup));",
                "  return () => {",
                "    elements.forEach((element) => element.removeEventListener('keyup', handleDocumentKeyup));",
                "  };",
                "}, []);",
            ]
            .join("\n")]
        );
        assert!(fragment.markup.is_none());
        assert!(fragment.requires.contains(&Requirement::UseEffect));
    }

    #[test]
    fn runtime_selectors_are_queried() {
        let fragment = run("$(sel).addClass('active');", &TransformOptions::default());

        assert!(fragment.setup[0].contains("const elements = document.querySelectorAll(sel);"));
        assert!(fragment.setup[0].contains("element.classList.add('active');"));
        assert_eq!(fragment.confidence, crate::traits::Confidence::Approximate);
    }
}
