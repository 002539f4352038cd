use std::time::Duration;

use axum::response::Html;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::misc::format_lifetime;

pub enum Banner<'a> {
    None,
    Error(&'a str),
    Info(&'a str),
}

pub struct LoginPage {
    template: String,
}

impl LoginPage {
    pub fn new(theme: &str, lifetime: Duration) -> Self {
        Self {
            template: include_str!("login.html")
                .replace("TEMPLATE_COLOR", &escape(theme))
                .replace("TEMPLATE_LIFETIME", &format_lifetime(lifetime)),
        }
    }

    pub fn render(&self, banner: Banner, username: &str, redirect: Option<&str>) -> Html<String> {
        let banner = match banner {
            Banner::None => String::new(),
            Banner::Error(message) => format!(r#"<div class="banner error">{}</div>"#, escape(message)),
            Banner::Info(message) => format!(r#"<div class="banner info">{}</div>"#, escape(message)),
        };
        let action = match redirect {
            Some(redirect) => format!(
                "/login?redirect={}",
                utf8_percent_encode(redirect, NON_ALPHANUMERIC)
            ),
            None => "/login".to_owned(),
        };

        Html(
            self.template
                .replace("TEMPLATE_BANNER", &banner)
                .replace("TEMPLATE_ACTION", &escape(&action))
                .replace("TEMPLATE_USERNAME", &escape(username)),
        )
    }
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}
