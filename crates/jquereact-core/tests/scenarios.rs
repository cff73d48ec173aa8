//! End-to-end behavior of the transformation pipeline.

use jquereact_core::{
    dispatch, Confidence, DetectContext, Dispatched, Engine, FallbackReason, GenerateContext,
    Match, Outcome, PatternRegistry, PatternRule, RuleError, Severity, SourceUnit,
    TransformOptions, TransformOutput, TransformRequest, Transpiler, WhitespaceFormatter,
};
use jquereact_core::traits::CodeFragment;
use jquereact_markup::{convert_document, MarkupDocument, DEFAULT_MAX_LINES, ELIDED_MARKER};
use pretty_assertions::assert_eq;

fn transform_with(
    transpiler: &Transpiler,
    content: &str,
    path: &str,
    options: &TransformOptions,
) -> TransformOutput {
    transpiler.transform(&TransformRequest::new(content, path, "Widget"), options)
}

fn transform(content: &str, path: &str) -> TransformOutput {
    let transpiler = Transpiler::new(PatternRegistry::standard()).with_formatter(WhitespaceFormatter);
    transform_with(&transpiler, content, path, &TransformOptions::default())
}

#[test]
fn unrecognized_idiom_falls_back_with_source() {
    let source = r#"select("div.x").setText("hi")"#;
    let output = transform(source, "widget.js");

    assert_eq!(output.outcome, Outcome::Fallback(FallbackReason::NoJQueryUsage));
    assert!(output.code.contains(source));
    assert!(output.code.contains("// no jQuery usage detected"));
}

#[test]
fn disabled_rule_falls_back_with_source() {
    let source = r#"$("div.x").text("hi")"#;
    let transpiler = Transpiler::new(PatternRegistry::standard().without("selector-chain"));
    let output = transform_with(&transpiler, source, "widget.js", &TransformOptions::default());

    assert_eq!(output.outcome, Outcome::Fallback(FallbackReason::NoUsableOutput));
    assert!(output.code.contains(source));
}

#[test]
fn event_binding_references_selector_and_handler() {
    let output = transform(r#"$(sel).on("click", handler)"#, "widget.js");

    assert!(matches!(output.outcome, Outcome::Transformed { fragments: 1, .. }));
    let body = output.code.split("function Widget()").nth(1).unwrap();
    assert!(body.contains("document.querySelectorAll(sel)"));
    assert!(body.contains("handler.call(event.currentTarget, event)"));
    assert!(body.contains("addEventListener('click'"));
}

#[test]
fn only_qualifying_inline_scripts_reach_the_engine() {
    let html = "<main><h1>Title</h1></main>\n<script>console.log('plain');</script>\n<script>$('h1').text('Hi');</script>";

    let Dispatched::Markup { unit: Some(unit), .. } = dispatch(html, "page.html").unwrap() else {
        panic!("expected a markup unit with script");
    };
    assert_eq!(unit.code, "$('h1').text('Hi');");

    let output = Engine::new(&PatternRegistry::standard()).run(&unit, &TransformOptions::default());
    assert_eq!(output.fragments.len(), 1);
    assert_eq!(output.fragments[0].script, Some(1));
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Info && d.script == Some(1)));
}

#[test]
fn mapped_plugin_becomes_component_and_unmapped_is_ignored() {
    let options = TransformOptions::default().with_plugin("tooltip", "Tooltip");
    let source = "$('.tip').tooltip({ placement: 'top' });\n$('#date').datepicker();";
    let unit = SourceUnit::script(source, "widget.js");

    let output = Engine::new(&PatternRegistry::standard()).run(&unit, &options);

    assert_eq!(output.fragments.len(), 1);
    assert_eq!(output.fragments[0].rule, "plugin-call");
    assert!(output.fragments[0].markup.as_deref().unwrap().starts_with("<Tooltip "));

    let unmapped = Engine::new(&PatternRegistry::standard())
        .run(&SourceUnit::script("$('#date').datepicker();", "widget.js"), &options);
    assert!(!unmapped.had_any_match);
}

#[test]
fn fallback_output_is_not_recognized_again() {
    let inputs = [
        "plain();",
        "$('#a').width(); /* note */ $.noop();",
        "var w = $('#a').width();",
        "<p>no script</p>",
    ];

    for input in inputs {
        let first = transform(input, "widget.js");
        assert!(first.is_fallback(), "{} should fall back", input);

        let second = transform(&first.code, "widget.js");
        assert_eq!(second.outcome, Outcome::Fallback(FallbackReason::NoJQueryUsage));
    }
}

#[test]
fn output_is_deterministic() {
    let source = "$('#title').text('Hi').on('click', function () { $(this).text('Clicked'); });\n\
                  $.get('/api/items', function (data) { render(data); });\n\
                  $('ul').on('click', 'li', open);";

    let first = transform(source, "widget.js");
    let second = transform(source, "widget.js");

    assert_eq!(first.code, second.code);
    assert_eq!(first.outcome, second.outcome);
}

#[test]
fn nested_chains_do_not_duplicate_fragments() {
    let output = transform(
        "$('#save').click(function () { $('#status').text('Saved'); });",
        "widget.js",
    );

    assert!(matches!(output.outcome, Outcome::Transformed { fragments: 1, .. }));
}

#[test]
fn markup_conversion_is_bounded() {
    let items: String = (0..50).map(|i| format!("<p>Item {}</p>\n", i)).collect();
    let document = MarkupDocument::parse(&format!("<body><div>\n{}</div></body>", items)).unwrap();

    let jsx = convert_document(&document, DEFAULT_MAX_LINES);

    assert!(jsx.lines().count() <= DEFAULT_MAX_LINES + 1);
    assert!(jsx.ends_with(ELIDED_MARKER));
}

#[test]
fn truncated_markup_still_produces_a_component() {
    let items: String = (0..20).map(|i| format!("  <li>Item {}</li>\n", i)).collect();
    let html = format!("<ul class=\"list\">\n{}</ul>\n<script>$('#msg').hide();</script>", items);

    let output = transform(&html, "page.html");

    assert!(matches!(output.outcome, Outcome::Markup { fragments: 1, .. }));
    assert!(output.code.contains("<WidgetContent />"));
    assert!(jquereact_core::validate::check_syntax(&output.code).is_ok());
}

#[test]
fn ajax_can_be_disabled() {
    let transpiler = Transpiler::new(PatternRegistry::standard());
    let options = TransformOptions::from_json(r#"{ "handleAjax": false }"#).unwrap();

    let output = transform_with(&transpiler, "$.get('/api/items', render);", "widget.js", &options);

    assert_eq!(output.outcome, Outcome::Fallback(FallbackReason::NoUsableOutput));
}

/// Matches a fixed byte range.
struct Fixed {
    id: &'static str,
    priority: u32,
    span: std::ops::Range<usize>,
}

impl PatternRule for Fixed {
    fn id(&self) -> &str {
        self.id
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn detect(&self, cx: &DetectContext<'_>) -> Result<Vec<Match>, RuleError> {
        Ok(vec![Match::new(self.id, cx.source(), self.span.clone())])
    }

    fn generate(&self, m: &Match, _cx: &mut GenerateContext<'_>) -> Result<CodeFragment, RuleError> {
        let mut fragment = CodeFragment::new(self.id, m.span.clone());
        fragment.markup = Some(format!("<p>{{'{}'}}</p>", self.id));
        Ok(fragment)
    }
}

#[test]
fn overlapping_matches_keep_the_earlier_one() {
    let registry = PatternRegistry::new(vec![
        Box::new(Fixed { id: "later", priority: 1, span: 4..12 }),
        Box::new(Fixed { id: "earlier", priority: 2, span: 0..8 }),
    ])
    .unwrap();
    let transpiler = Transpiler::new(registry);

    let output = transform_with(&transpiler, "$('#a').hide();", "widget.js", &TransformOptions::default());

    assert!(output.code.contains("<p>{'earlier'}</p>"));
    assert!(!output.code.contains("<p>{'later'}</p>"));
}

#[test]
fn exact_ties_go_to_the_lower_priority_number() {
    let registry = PatternRegistry::new(vec![
        Box::new(Fixed { id: "second", priority: 20, span: 0..8 }),
        Box::new(Fixed { id: "first", priority: 10, span: 0..8 }),
    ])
    .unwrap();

    let output = Engine::new(&registry).run(
        &SourceUnit::script("$('#a').hide();", "widget.js"),
        &TransformOptions::default(),
    );

    assert_eq!(output.fragments.len(), 1);
    assert_eq!(output.fragments[0].rule, "first");
}

/// Fails in detection or generation.
struct Failing {
    id: &'static str,
    panic_in_detect: bool,
}

impl PatternRule for Failing {
    fn id(&self) -> &str {
        self.id
    }

    fn priority(&self) -> u32 {
        1
    }

    fn detect(&self, cx: &DetectContext<'_>) -> Result<Vec<Match>, RuleError> {
        if self.panic_in_detect {
            panic!("detector exploded");
        }
        Ok(vec![Match::new(self.id, cx.source(), 0..1)])
    }

    fn generate(&self, _m: &Match, _cx: &mut GenerateContext<'_>) -> Result<CodeFragment, RuleError> {
        Err(RuleError::Unsupported("always fails".to_string()))
    }
}

#[test]
fn failing_rules_only_lose_their_own_contribution() {
    for panic_in_detect in [false, true] {
        let mut rules: Vec<Box<dyn PatternRule>> = vec![Box::new(Failing {
            id: "failing",
            panic_in_detect,
        })];
        rules.push(Box::new(jquereact_core::rules::SelectorChainRule));
        let transpiler = Transpiler::new(PatternRegistry::new(rules).unwrap());

        // The failing match covers only the leading newline
        let source = "\n$('#a').hide();";
        let output = transform_with(&transpiler, source, "widget.js", &TransformOptions::default());

        assert!(matches!(output.outcome, Outcome::Transformed { fragments: 1, .. }));
        assert!(output
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning && d.rule.as_deref() == Some("failing")));
    }
}

#[test]
fn approximate_fragments_are_flagged() {
    let unit = SourceUnit::script("$('#panel').fadeIn(200).text('Ready');", "widget.js");
    let output = Engine::new(&PatternRegistry::standard()).run(&unit, &TransformOptions::default());

    assert_eq!(output.fragments.len(), 1);
    assert_eq!(output.fragments[0].confidence, Confidence::Approximate);
}
