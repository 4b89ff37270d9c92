// The template type every structured call uses.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// A fixed instruction pair. `user` may contain `{name}` placeholders that are
/// filled by [`PromptTemplate::render`]; the JSON schema the model must follow
/// lives inside the template text.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub system: &'static str,
    pub user: &'static str,
}

impl PromptTemplate {
    /// Substitutes `{name}` placeholders in a single pass.
    ///
    /// Substituted values are never rescanned, so resume text that happens to
    /// contain `{technical}` is sent verbatim. Braces that do not name a known
    /// variable (e.g. the JSON schema examples) are left untouched.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let template = self.user;
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let replaced = after.find('}').and_then(|close| {
                let name = &after[..close];
                vars.iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (close, *value))
            });
            match replaced {
                Some((close, value)) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}
