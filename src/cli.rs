use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "stockdesk", version, about = "Terminal client for a product catalogue API")]
pub struct Args {
    /// Base URL of the product API, overrides the config file
    #[arg(long, env = "STOCKDESK_API_URL")]
    pub api_url: Option<String>,

    /// Pre-fill the email field on the login screen
    #[arg(short, long)]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_flags() {
        let args = Args::parse_from(["stockdesk", "--api-url", "http://api.test", "-e", "a@b.com"]);
        assert_eq!(args.api_url.as_deref(), Some("http://api.test"));
        assert_eq!(args.email.as_deref(), Some("a@b.com"));
    }
}
