//! Rendering of the generated routes file.
//!
//! The host router includes this file at boot. It holds a fixed header
//! followed by one `CroogoRouter::connect(...)` call per enabled route:
//!
//! ```text
//! <?php
//! #DO NOT EDIT THIS FILE DIRECTLY!
//! #IT IS UPDATED BY THE ROUTE PLUGIN WHENEVER YOU ADD, DELETE, ENABLE OR DISABLE A ROUTE.
//! CroogoRouter::connect('/about-us', array('plugin' => 'nodes', ...));
//! ?>
//! ```

use crate::route_body::RouteBody;

/// Default file name inside the plugin config directory.
pub const ROUTES_FILE_NAME: &str = "routes.php";

const OPEN_TAG: &str = "<?php";
const CLOSE_TAG: &str = "?>";
const HEADER_COMMENTS: [&str; 2] = [
    "#DO NOT EDIT THIS FILE DIRECTLY!",
    "#IT IS UPDATED BY THE ROUTE PLUGIN WHENEVER YOU ADD, DELETE, ENABLE OR DISABLE A ROUTE.",
];

/// Render the whole file, one line per `(alias, body)` in the given order.
///
/// # Examples
///
/// ```
/// use nodealias_core::route_body::RouteBody;
/// use nodealias_core::routes_file::render_routes_file;
///
/// let body = RouteBody::for_node("page", "about");
/// let text = render_routes_file([("about-us", &body)]);
/// assert!(text.starts_with("<?php\n"));
/// assert!(text.ends_with("?>"));
/// ```
pub fn render_routes_file<'a, I>(routes: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a RouteBody)>,
{
    let mut out = String::new();
    out.push_str(OPEN_TAG);
    out.push('\n');
    for comment in HEADER_COMMENTS {
        out.push_str(comment);
        out.push('\n');
    }
    for (alias, body) in routes {
        out.push_str(&render_connect(alias, body));
        out.push('\n');
    }
    out.push_str(CLOSE_TAG);
    out
}

/// A single registration call, without the trailing newline.
pub fn render_connect(alias: &str, body: &RouteBody) -> String {
    format!(
        "CroogoRouter::connect({}, {});",
        quote(&format!("/{alias}")),
        render_params(body)
    )
}

fn render_params(body: &RouteBody) -> String {
    let pairs = [
        ("plugin", body.plugin.as_str()),
        ("controller", body.controller.as_str()),
        ("action", body.action.as_str()),
        ("type", body.content_type.as_str()),
        ("slug", body.slug.as_str()),
    ];
    let rendered: Vec<String> = pairs
        .iter()
        .map(|(key, value)| format!("{} => {}", quote(key), quote(value)))
        .collect();
    format!("array({})", rendered.join(", "))
}

/// Single-quoted literal; only `\` and `'` need escaping.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}
