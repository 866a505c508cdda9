use handlebars::{handlebars_helper, Handlebars};
use serde_json::Value;

pub fn get_handlebars() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();

    handlebars_helper!(exists: |v: Value| !v.is_null());
    handlebars.register_helper("exists", Box::new(exists));

    handlebars
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn handlebars_can_render() {
        let handlebars = get_handlebars();
        let res = handlebars
            .render_template("Hello {{name}}", &json!({"name": "foo"}))
            .expect("This to render");
        assert_eq!(res, "Hello foo");
    }

    #[test]
    fn handlebars_escapes_html() {
        let handlebars = get_handlebars();
        let res = handlebars
            .render_template("<p>{{description}}</p>", &json!({"description": "<b>HQ</b>"}))
            .expect("This to render");
        assert_eq!(res, "<p>&lt;b&gt;HQ&lt;/b&gt;</p>");
    }

    #[test]
    fn handlebars_helper_exists_can_render() {
        let handlebars = get_handlebars();
        let res = handlebars
            .render_template(
                r#"{{#if (exists pin.link)}}<a href="{{pin.link}}">link</a>{{/if}}"#,
                &json!({
                    "pin": {
                        "link": "https://example.com",
                    }
                }),
            )
            .expect("This to render");
        assert_eq!(res, r#"<a href="https://example.com">link</a>"#);
    }

    #[test]
    fn handlebars_helper_exists_skips_null() {
        let handlebars = get_handlebars();
        let res = handlebars
            .render_template(
                r#"{{#if (exists pin.link)}}<a href="{{pin.link}}">link</a>{{/if}}"#,
                &json!({ "pin": { "link": null } }),
            )
            .expect("This to render");
        assert_eq!(res, "");
    }
}
