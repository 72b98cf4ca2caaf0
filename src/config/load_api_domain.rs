use anyhow::{bail, Result};

pub(crate) const DEFAULT_API_DOMAIN: &str = "api.openai.com";

/// Resolve the Model API domain, falling back to the OpenAI endpoint.
/// The domain must not include a scheme or a path.
pub(crate) fn load_api_domain(domain: Option<String>) -> Result<String> {
    let domain = domain
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_API_DOMAIN.to_string());

    validate_api_domain(&domain)?;
    Ok(domain)
}

pub(crate) fn validate_api_domain(input: &str) -> Result<()> {
    let s = input.trim();

    if s.is_empty() {
        bail!("Model API domain cannot be empty.");
    }
    if s.starts_with("http://") || s.starts_with("https://") {
        bail!("Invalid Model API domain: do not include http:// or https://");
    }
    if s.contains('/') || s.contains('?') || s.contains('#') {
        bail!("Provide only a domain, e.g., api.openai.com, no paths like /v1.");
    }
    if s.split_whitespace().count() != 1 {
        bail!("Domain must not contain spaces or tabs.");
    }

    Ok(())
}
