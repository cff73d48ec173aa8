//! Remote calls: `$.ajax(...)`, `$.get(...)`, `$.post(...)`, `$.getJSON(...)`.

use crate::chain::{object_entries, UtilityCall};
use crate::handler::Handler;
use crate::layout::{block, indent};
use crate::naming::{to_camel_case, to_pascal_case};
use crate::options::AjaxTarget;
use crate::rules::reparse_utility;
use crate::scan::string_literal;
use crate::traits::{
    CodeFragment, DetectContext, GenerateContext, Match, PatternRule, Requirement, RuleError,
};

const FUNCTIONS: &[&str] = &["ajax", "get", "post", "getJSON"];

/// Remote calls, translated into a data-fetch effect.
///
/// Detects nothing when the AJAX target is `none`.
pub struct RemoteCallRule;

impl PatternRule for RemoteCallRule {
    fn id(&self) -> &str {
        "remote-call"
    }

    fn priority(&self) -> u32 {
        50
    }

    fn detect(&self, cx: &DetectContext<'_>) -> Result<Vec<Match>, RuleError> {
        if cx.options.handle_ajax == AjaxTarget::None {
            return Ok(Vec::new());
        }

        Ok(cx
            .utility_calls()
            .iter()
            .filter(|call| FUNCTIONS.contains(&call.function.as_str()))
            .map(|call| {
                Match::new(self.id(), cx.source(), call.span.clone())
                    .capture("function", call.function.as_str())
                    .capture("url", call.args.first().cloned().unwrap_or_default())
            })
            .collect())
    }

    fn generate(&self, m: &Match, cx: &mut GenerateContext<'_>) -> Result<CodeFragment, RuleError> {
        let call = reparse_utility(m)?;
        let request = Request::from_call(&call)?;
        let target = cx.options.handle_ajax;
        if target == AjaxTarget::None {
            return Err(RuleError::Unsupported("remote calls are disabled".to_string()));
        }

        let mut fragment = CodeFragment::new(self.id(), m.span.clone());
        let mut exact = request.exact;

        let stem = url_stem(&request.url);
        let (value, setter) = cx.names.claim_state(&format!("{}Data", stem));

        let mut body = Vec::new();
        let mut callbacks: [Vec<String>; 3] = Default::default();
        let groups = [
            ("Success", &request.success),
            ("Error", &request.error),
            ("Complete", &request.complete),
        ];
        for (slot, (kind, handlers)) in groups.iter().enumerate() {
            for handler in handlers.iter() {
                let converted = Handler::parse(handler).to_callback();
                exact &= converted.exact;
                let name = cx
                    .names
                    .claim(&format!("handle{}{}", to_pascal_case(&stem), kind));
                body.push(format!("const {} = {};", name, converted.code));
                callbacks[slot].push(name);
            }
        }
        let [success, error, complete] = callbacks;

        let (mut statement, result) = match target {
            AjaxTarget::Fetch => {
                if !request.json {
                    exact = false;
                }
                (request.fetch_call(), "result")
            }
            _ => (request.axios_call(), "response.data"),
        };

        let mut segments = Vec::new();
        if target == AjaxTarget::Fetch {
            segments.push(".then((response) => response.json())".to_string());
        }
        let mut on_result = vec![format!("{}({});", setter, result)];
        on_result.extend(success.iter().map(|name| format!("{}({});", name, result)));
        let param = if target == AjaxTarget::Fetch { "result" } else { "response" };
        segments.push(format!(".then(({}) => {})", param, block(&on_result.join("\n"))));

        if !error.is_empty() {
            let calls: Vec<String> = error.iter().map(|name| format!("{}(error);", name)).collect();
            segments.push(format!(".catch((error) => {})", block(&calls.join("\n"))));
        }
        if !complete.is_empty() {
            let calls: Vec<String> = complete.iter().map(|name| format!("{}();", name)).collect();
            segments.push(format!(".finally(() => {})", block(&calls.join("\n"))));
        }

        for segment in &segments {
            statement.push('\n');
            statement.push_str(&indent(segment, 2));
        }
        statement.push(';');
        body.push(statement);

        fragment.setup.push(format!("const [{}, {}] = useState(null);", value, setter));
        fragment
            .setup
            .push(format!("useEffect(() => {}, []);", block(&body.join("\n"))));
        fragment.requires.insert(Requirement::UseState);
        fragment.requires.insert(Requirement::UseEffect);
        if target == AjaxTarget::Axios {
            fragment.requires.insert(Requirement::Axios);
        }
        if !exact {
            fragment.approximate();
        }

        Ok(fragment)
    }
}

/// A remote call normalized across the jQuery entry points.
#[derive(Debug, Default)]
struct Request {
    /// Lowercase HTTP method
    method: String,

    url: String,
    data: Option<String>,

    /// The response is known to be JSON
    json: bool,

    success: Vec<String>,
    error: Vec<String>,
    complete: Vec<String>,
    exact: bool,
}

impl Request {
    fn from_call(call: &UtilityCall) -> Result<Self, RuleError> {
        let mut request = Request {
            method: "get".to_string(),
            json: call.function == "getJSON",
            exact: true,
            ..Default::default()
        };

        match call.function.as_str() {
            "ajax" => request.read_settings(&call.args),
            _ => {
                if call.function == "post" {
                    request.method = "post".to_string();
                }
                let mut args = call.args.iter();
                if let Some(url) = args.next() {
                    request.url = url.clone();
                }
                request.read_shorthand(args.map(String::as_str).collect());
            }
        }

        for continuation in &call.continuations {
            let args = &continuation.args;
            match (continuation.method.as_str(), args.as_slice()) {
                ("done", handlers) => request.success.extend(handlers.iter().cloned()),
                ("fail" | "catch", handlers) => request.error.extend(handlers.iter().cloned()),
                ("always", handlers) => request.complete.extend(handlers.iter().cloned()),
                ("then", [on_success]) => request.success.push(on_success.clone()),
                ("then", [on_success, on_error]) => {
                    request.success.push(on_success.clone());
                    request.error.push(on_error.clone());
                }
                _ => request.exact = false,
            }
        }

        if request.url.is_empty() {
            return Err(RuleError::Malformed(format!(
                "$.{} call without a URL",
                call.function
            )));
        }
        Ok(request)
    }

    /// `$.get(url, [data], [success], [dataType])`
    fn read_shorthand(&mut self, args: Vec<&str>) {
        for (i, arg) in args.iter().enumerate() {
            let last = i + 1 == args.len();
            if is_function(arg) {
                self.success.push(arg.to_string());
            } else if let Some(data_type) = string_literal(arg).filter(|_| !self.success.is_empty()) {
                self.json = data_type == "json";
            } else if self.data.is_none() && !(last && i > 0) {
                self.data = Some(arg.to_string());
            } else {
                self.success.push(arg.to_string());
            }
        }
    }

    /// `$.ajax(settings)` or `$.ajax(url, settings)`
    fn read_settings(&mut self, args: &[String]) {
        let settings = match args {
            [settings] => settings,
            [url, settings] => {
                self.url = url.clone();
                settings
            }
            _ => {
                self.exact = false;
                return;
            }
        };

        let Some(entries) = object_entries(settings) else {
            if self.url.is_empty() && string_literal(settings).is_some() {
                self.url = settings.clone();
            } else if self.url.is_empty() {
                self.url = format!("{}.url", settings);
            }
            self.exact = false;
            return;
        };

        for (key, value) in entries {
            match key.as_str() {
                "url" => self.url = value,
                "type" | "method" => match string_literal(&value) {
                    Some(method) => self.method = method.to_ascii_lowercase(),
                    None => self.exact = false,
                },
                "data" => self.data = Some(value),
                "dataType" => self.json = string_literal(&value).is_some_and(|t| t == "json"),
                "success" => self.success.push(value),
                "error" => self.error.push(value),
                "complete" => self.complete.push(value),
                _ => self.exact = false,
            }
        }
    }

    fn sends_body(&self) -> bool {
        !matches!(self.method.as_str(), "get" | "delete" | "head")
    }

    fn axios_call(&self) -> String {
        match (&self.data, self.sends_body()) {
            (None, _) => format!("axios.{}({})", self.method, self.url),
            (Some(data), true) => format!("axios.{}({}, {})", self.method, self.url, data),
            (Some(data), false) => {
                format!("axios.{}({}, {{ params: {} }})", self.method, self.url, data)
            }
        }
    }

    fn fetch_call(&self) -> String {
        let method = self.method.to_ascii_uppercase();
        match (&self.data, self.sends_body()) {
            (None, false) if method == "GET" => format!("fetch({})", self.url),
            (None, _) => format!("fetch({}, {{ method: '{}' }})", self.url, method),
            (Some(data), false) => format!(
                "fetch({} + '?' + new URLSearchParams({}), {{ method: '{}' }})",
                self.url, data, method
            ),
            (Some(data), true) => format!(
                "fetch({}, {{\n  method: '{}',\n  headers: {{ 'Content-Type': 'application/json' }},\n  body: JSON.stringify({}),\n}})",
                self.url, method, data
            ),
        }
    }
}

fn is_function(arg: &str) -> bool {
    matches!(Handler::parse(arg), Handler::Function { .. } | Handler::Arrow(_))
}

/// Naming stem from a URL literal: the last path segment without extension.
fn url_stem(url: &str) -> String {
    let stem = string_literal(url).and_then(|url| {
        let path = url.split(['?', '#']).next().unwrap_or("");
        path.rsplit('/')
            .find(|segment| !segment.is_empty())
            .and_then(|segment| segment.split('.').next())
            .filter(|segment| segment.chars().any(|c| c.is_ascii_alphabetic()))
            .map(to_camel_case)
    });
    stem.unwrap_or_else(|| "request".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TransformOptions;
    use pretty_assertions::assert_eq;

    fn generate(source: &str, options: &TransformOptions) -> CodeFragment {
        let cx = DetectContext::new(source, options);
        let m = RemoteCallRule.detect(&cx).unwrap().remove(0);
        let mut generate_cx = GenerateContext::new(options);
        RemoteCallRule.generate(&m, &mut generate_cx).unwrap()
    }

    #[test]
    fn axios_get_with_success() {
        let fragment = generate(
            "$.get('/api/users', function (data) {\n  render(data);\n});",
            &TransformOptions::default(),
        );

        assert_eq!(fragment.setup[0], "const [usersData, setUsersData] = useState(null);");
        assert_eq!(
            fragment.setup[1],
            [
                "useEffect(() => {",
                "  const handleUsersSuccess = (data) => {",
                "    render(data);",
                "  };",
                "  axios.get('/api/users')",
                "    .then((response) => {",
                "      setUsersData(response.data);",
                "      handleUsersSuccess(response.data);",
                "    });",
                "}, []);",
            ]
            .join("\n")
        );
        assert!(fragment.requires.contains(&Requirement::Axios));
    }

    #[test]
    fn fetch_post_from_ajax_settings() {
        let options = TransformOptions::default().with_ajax(AjaxTarget::Fetch);
        let fragment = generate(
            "$.ajax({ url: '/api/save', type: 'POST', data: payload, dataType: 'json' }).fail(report);",
            &options,
        );

        let effect = &fragment.setup[1];
        assert!(effect.contains("fetch('/api/save', {"));
        assert!(effect.contains("method: 'POST',"));
        assert!(effect.contains("body: JSON.stringify(payload),"));
        assert!(effect.contains(".then((response) => response.json())"));
        assert!(effect.contains("setSaveData(result);"));
        assert!(effect.contains(".catch((error) => {"));
        assert!(!fragment.requires.contains(&Requirement::Axios));
        assert_eq!(fragment.confidence, crate::traits::Confidence::Exact);
    }

    #[test]
    fn disabled_ajax_detects_nothing() {
        let options = TransformOptions::default().with_ajax(AjaxTarget::None);
        let cx = DetectContext::new("$.get('/a');", &options);

        assert!(RemoteCallRule.detect(&cx).unwrap().is_empty());
    }

    #[test]
    fn ignores_other_utilities() {
        let options = TransformOptions::default();
        let cx = DetectContext::new("$.each(items, fn); $.extend(a, b);", &options);

        assert!(RemoteCallRule.detect(&cx).unwrap().is_empty());
    }

    #[test]
    fn url_stems() {
        assert_eq!(url_stem("'/api/users?page=2'"), "users");
        assert_eq!(url_stem("'data/items.json'"), "items");
        assert_eq!(url_stem("endpoint"), "request");
    }
}
