// Licensed under the Apache-2.0 license

//! Line-level patching of the master packaging script.
//!
//! A [`Template`] keeps every line together with its original terminator so
//! that untouched lines are written back byte-for-byte. [`patch`] applies an
//! ordered list of [`PatchRule`]s in a single top-to-bottom pass:
//!
//! - a line matches a rule when it starts with the rule's pattern;
//! - the first still-unsatisfied rule matching a line replaces it and is then
//!   satisfied, so later lines matching the same pattern are left alone;
//! - once every rule is satisfied the rest of the template is copied as is.
//!
//! Rules that never matched are returned in [`PatchOutcome::unsatisfied`].

/// One line of a script, without and with its terminator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    /// `"\n"`, `"\r\n"` or `""` for a final line without a terminator.
    pub ending: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Template {
    pub lines: Vec<Line>,
}

impl Template {
    pub fn parse(text: &str) -> Self {
        let lines = text
            .split_inclusive('\n')
            .map(|raw| {
                if let Some(text) = raw.strip_suffix("\r\n") {
                    Line {
                        text: text.to_string(),
                        ending: "\r\n",
                    }
                } else if let Some(text) = raw.strip_suffix('\n') {
                    Line {
                        text: text.to_string(),
                        ending: "\n",
                    }
                } else {
                    Line {
                        text: raw.to_string(),
                        ending: "",
                    }
                }
            })
            .collect();
        Self { lines }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.text);
            out.push_str(line.ending);
        }
        out
    }
}

/// Replaces the first line starting with `pattern` by `replacement`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchRule {
    pub pattern: String,
    pub replacement: String,
}

impl PatchRule {
    pub fn new(pattern: &str, replacement: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }

    /// Rule for a Tcl `set <name> <value>` line.
    ///
    /// ```
    /// use xo_builder::template::PatchRule;
    ///
    /// let rule = PatchRule::setting("debug_dir", "\"/tmp/pack/debug\"");
    /// assert_eq!(rule.pattern, "set debug_dir ");
    /// assert_eq!(rule.replacement, "set debug_dir \"/tmp/pack/debug\"");
    /// ```
    pub fn setting(name: &str, value: &str) -> Self {
        Self {
            pattern: format!("set {name} "),
            replacement: format!("set {name} {value}"),
        }
    }

    pub fn matches(&self, line: &str) -> bool {
        line.starts_with(&self.pattern)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchOutcome {
    pub template: Template,
    /// Patterns of the rules that matched no line, in rule order.
    pub unsatisfied: Vec<String>,
}

impl PatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.unsatisfied.is_empty()
    }
}

/// Applies `rules` to `template`. Pure; the template itself is not modified.
pub fn patch(template: &Template, rules: &[PatchRule]) -> PatchOutcome {
    let mut satisfied = vec![false; rules.len()];
    let mut remaining = rules.len();
    let mut lines = Vec::with_capacity(template.lines.len());

    let mut iter = template.lines.iter();
    while remaining > 0 {
        let Some(line) = iter.next() else {
            break;
        };
        let hit = rules
            .iter()
            .enumerate()
            .find(|(i, rule)| !satisfied[*i] && rule.matches(&line.text));
        match hit {
            Some((i, rule)) => {
                satisfied[i] = true;
                remaining -= 1;
                lines.push(Line {
                    text: rule.replacement.clone(),
                    ending: line.ending,
                });
            }
            None => lines.push(line.clone()),
        }
    }
    lines.extend(iter.cloned());

    let unsatisfied = rules
        .iter()
        .zip(&satisfied)
        .filter(|(_, done)| !**done)
        .map(|(rule, _)| rule.pattern.clone())
        .collect();

    PatchOutcome {
        template: Template { lines },
        unsatisfied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "\
# master packaging script
set kernel_xml \"<KERNEL_XML>\"
set solution_dir \"<SOLUTION_DIR>\"
set kernel_xml \"<DUPLICATE>\"
puts \"done\"
";

    fn rules() -> Vec<PatchRule> {
        vec![
            PatchRule::setting("kernel_xml", "\"/abs/kernel.xml\""),
            PatchRule::setting("solution_dir", "\"/abs/src\""),
        ]
    }

    #[test]
    fn test_parse_render_preserves_bytes() {
        for text in ["", "a", "a\n", "a\r\nb\n", "a\n\nb", "\n\n"] {
            assert_eq!(Template::parse(text).render(), text);
        }
    }

    #[test]
    fn test_replaces_first_match_only() {
        let outcome = patch(&Template::parse(TEMPLATE), &rules());
        assert!(outcome.is_complete());
        assert_eq!(
            outcome.template.render(),
            "\
# master packaging script
set kernel_xml \"/abs/kernel.xml\"
set solution_dir \"/abs/src\"
set kernel_xml \"<DUPLICATE>\"
puts \"done\"
"
        );
    }

    #[test]
    fn test_unsatisfied_patterns_are_reported() {
        let mut rules = rules();
        rules.push(PatchRule::setting("xo_path", "\"/abs/k.xo\""));
        let outcome = patch(&Template::parse(TEMPLATE), &rules);
        assert_eq!(outcome.unsatisfied, vec!["set xo_path ".to_string()]);
        // The rules that did match are still applied.
        assert!(outcome.template.render().contains("set solution_dir \"/abs/src\"\n"));
    }

    #[test]
    fn test_match_is_anchored() {
        let template = Template::parse("  set kernel_xml \"x\"\n# set kernel_xml \"y\"\n");
        let outcome = patch(&template, &rules()[..1]);
        assert_eq!(outcome.template, template);
        assert_eq!(outcome.unsatisfied, vec!["set kernel_xml ".to_string()]);
    }

    #[test]
    fn test_line_satisfies_at_most_one_rule() {
        let rules = vec![PatchRule::new("set a", "A1"), PatchRule::new("set ab", "A2")];
        let outcome = patch(&Template::parse("set ab\nset ab\n"), &rules);
        assert_eq!(outcome.template.render(), "A1\nA2\n");
        assert!(outcome.is_complete());
    }

    #[test]
    fn test_keeps_crlf_endings() {
        let template = Template::parse("set kernel_xml \"x\"\r\nother\r\n");
        let outcome = patch(&template, &rules()[..1]);
        assert_eq!(
            outcome.template.render(),
            "set kernel_xml \"/abs/kernel.xml\"\r\nother\r\n"
        );
    }

    #[test]
    fn test_repatching_is_a_no_op() {
        let first = patch(&Template::parse(TEMPLATE), &rules());
        let second = patch(&first.template, &rules());
        assert!(second.is_complete());
        assert_eq!(second.template, first.template);
        assert!(!second.template.render().contains("<KERNEL_XML>"));
    }

    #[test]
    fn test_no_rules_copies_template() {
        let template = Template::parse(TEMPLATE);
        let outcome = patch(&template, &[]);
        assert_eq!(outcome.template, template);
        assert!(outcome.is_complete());
    }
}
