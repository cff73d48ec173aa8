//! Assembly & naming.
//!
//! Merges generated fragments and converted markup into one component
//! module. Components are assembled under [`COMPONENT_PLACEHOLDER`] and
//! renamed with [`apply_name`] as the last step.

use std::collections::BTreeSet;

use crate::layout::indent;
use crate::scaffold::excerpt;
use crate::traits::{CodeFragment, Confidence, Requirement};

/// Canonical component name used while assembling.
pub const COMPONENT_PLACEHOLDER: &str = "__JQUEREACT_COMPONENT__";

/// How converted markup is placed in the markup-path component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureEmbedding {
    /// Rendered as JSX children of the container
    Rendered,

    /// Kept as a JSX comment inside the container
    Commented,
}

/// Import declarations for a set of requirements.
pub fn imports(requires: &BTreeSet<Requirement>) -> String {
    let hooks: Vec<&str> = requires.iter().filter_map(|r| r.hook()).collect();

    let mut out = if hooks.is_empty() {
        "import React from 'react';\n".to_string()
    } else {
        format!("import React, {{ {} }} from 'react';\n", hooks.join(", "))
    };
    if requires.contains(&Requirement::Axios) {
        out.push_str("import axios from 'axios';\n");
    }
    out
}

/// Comment header carrying an excerpt of the original source.
fn header(source: &str) -> String {
    format!(
        "// Converted from jQuery by jquereact\n// Original source:\n/*\n{}\n*/\n",
        excerpt(source)
    )
}

/// Union of the requirements of every fragment.
fn requirements(fragments: &[CodeFragment]) -> BTreeSet<Requirement> {
    fragments.iter().flat_map(|f| f.requires.iter().copied()).collect()
}

/// Body statements: each fragment's setup as one blank-line separated group.
fn setup_section(fragments: &[CodeFragment]) -> Vec<String> {
    let mut groups = Vec::new();
    for fragment in fragments {
        let mut lines = Vec::new();
        if fragment.confidence == Confidence::Approximate {
            lines.push(format!("// Approximate conversion ({}): review before use", fragment.rule));
        }
        lines.extend(fragment.setup.iter().cloned());
        if !lines.is_empty() {
            groups.push(lines.join("\n"));
        }
    }
    groups
}

/// The function body rendering `fragments`.
fn render_body(fragments: &[CodeFragment]) -> String {
    let mut body: Vec<String> = setup_section(fragments)
        .iter()
        .map(|group| indent(group, 2))
        .collect();

    let markup: Vec<&str> = fragments.iter().filter_map(|f| f.markup.as_deref()).collect();
    if markup.is_empty() {
        body.push("  return null;".to_string());
    } else {
        let children = markup
            .iter()
            .map(|m| indent(m, 6))
            .collect::<Vec<_>>()
            .join("\n");
        body.push(format!("  return (\n    <>\n{}\n    </>\n  );", children));
    }

    body.join("\n\n")
}

/// Assemble the script-path component under the placeholder name.
pub fn script_component(fragments: &[CodeFragment], source: &str) -> String {
    let mut out = imports(&requirements(fragments));
    out.push('\n');
    out.push_str(&header(source));
    out.push('\n');
    out.push_str(&format!("function {}() {{\n", COMPONENT_PLACEHOLDER));
    out.push_str(&render_body(fragments));
    out.push_str("\n}\n\n");
    out.push_str(&format!("export default {};\n", COMPONENT_PLACEHOLDER));
    out
}

/// Assemble the markup-path component under the placeholder name.
///
/// Script fragments, if any, become a `<Name>Content` component rendered
/// inside the container next to the converted structure.
pub fn markup_component(
    fragments: &[CodeFragment],
    structure: &str,
    source: &str,
    embedding: StructureEmbedding,
) -> String {
    let mut requires = requirements(fragments);
    requires.insert(Requirement::UseEffect);
    requires.insert(Requirement::UseRef);

    let mut out = imports(&requires);
    out.push('\n');
    out.push_str(&header(source));
    out.push('\n');

    let content = (!fragments.is_empty()).then(|| format!("{}Content", COMPONENT_PLACEHOLDER));
    if let Some(content) = &content {
        out.push_str(&format!("function {}() {{\n", content));
        out.push_str(&render_body(fragments));
        out.push_str("\n}\n\n");
    }

    out.push_str(&format!("function {}() {{\n", COMPONENT_PLACEHOLDER));
    out.push_str("  const containerRef = useRef(null);\n\n");
    out.push_str("  useEffect(() => {\n");
    out.push_str("    // Behavior not converted above can attach to containerRef.current here\n");
    out.push_str("  }, []);\n\n");
    out.push_str("  return (\n");
    out.push_str("    <div ref={containerRef}>\n");

    let structure = structure.trim();
    if !structure.is_empty() {
        let placed = match embedding {
            StructureEmbedding::Rendered => structure.to_string(),
            StructureEmbedding::Commented => {
                format!("{{/*\n{}\n*/}}", structure.replace("*/", "*\\/"))
            }
        };
        out.push_str(&indent(&placed, 6));
        out.push('\n');
    }
    if let Some(content) = &content {
        out.push_str(&format!("      <{} />\n", content));
    }

    out.push_str("    </div>\n");
    out.push_str("  );\n");
    out.push_str("}\n\n");
    out.push_str(&format!("export default {};\n", COMPONENT_PLACEHOLDER));
    out
}

/// Substitute the caller's component name for the placeholder.
pub fn apply_name(template: &str, name: &str) -> String {
    template.replace(COMPONENT_PLACEHOLDER, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fragment(setup: &[&str], markup: Option<&str>) -> CodeFragment {
        let mut fragment = CodeFragment::new("test", 0..1);
        fragment.setup = setup.iter().map(|s| s.to_string()).collect();
        fragment.markup = markup.map(str::to_string);
        fragment
    }

    #[test]
    fn imports_union_of_hooks() {
        let requires = BTreeSet::from([Requirement::UseState, Requirement::UseEffect, Requirement::Axios]);
        assert_eq!(
            imports(&requires),
            "import React, { useEffect, useState } from 'react';\nimport axios from 'axios';\n"
        );
        assert_eq!(imports(&BTreeSet::new()), "import React from 'react';\n");
    }

    #[test]
    fn assembles_script_component() {
        let mut first = fragment(&["const [title, setTitle] = useState('Hi');"], Some("<h1>{title}</h1>"));
        first.requires.insert(Requirement::UseState);
        let second = fragment(&[], Some("<button onClick={save} />"));

        let out = apply_name(&script_component(&[first, second], "$('h1').text('Hi');"), "Greeting");

        let expected = "import React, { useState } from 'react';

// Converted from jQuery by jquereact
// Original source:
/*
$('h1').text('Hi');
*/

function Greeting() {
  const [title, setTitle] = useState('Hi');

  return (
    <>
      <h1>{title}</h1>
      <button onClick={save} />
    </>
  );
}

export default Greeting;
";
        assert_eq!(out, expected);
    }

    #[test]
    fn setup_only_fragments_return_null() {
        let mut effect = fragment(&["useEffect(() => {\n  load();\n}, []);"], None);
        effect.requires.insert(Requirement::UseEffect);
        effect.approximate();

        let out = script_component(&[effect], "");

        assert!(out.contains("  // Approximate conversion (test): review before use\n  useEffect(() => {\n    load();\n  }, []);"));
        assert!(out.contains("  return null;\n}"));
    }

    #[test]
    fn markup_component_wraps_structure() {
        let out = apply_name(
            &markup_component(&[fragment(&[], Some("<p />"))], "<main>\n  <h1>Hi</h1>\n</main>", "<main/>", StructureEmbedding::Rendered),
            "Page",
        );

        assert!(out.starts_with("import React, { useEffect, useRef } from 'react';\n"));
        assert!(out.contains("function PageContent() {"));
        assert!(out.contains("    <div ref={containerRef}>\n      <main>\n        <h1>Hi</h1>\n      </main>\n      <PageContent />\n    </div>"));
        assert!(out.ends_with("export default Page;\n"));
        assert!(!out.contains(COMPONENT_PLACEHOLDER));
    }

    #[test]
    fn commented_structure_cannot_close_early() {
        let out = markup_component(&[], "<p>{/* x */}</p>", "", StructureEmbedding::Commented);

        assert!(out.contains("{/*\n      <p>{/* x *\\/}</p>\n      */}"));
        assert!(!out.contains("Content"));
    }
}
