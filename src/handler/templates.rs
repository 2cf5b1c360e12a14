//! Template-backed responses.
//!
//! Templates are loaded from an explicitly passed root directory; there is
//! no process-wide template root. Rendering is delegated to minijinja, and
//! a rendering failure is propagated as a [`HandlerError`] rather than
//! turned into a partial response.

use minijinja::{Environment, context, path_loader};

use crate::handler::HandlerError;
use crate::http::response::{HttpResponse, ResponseHeader};
use crate::http::status::HttpStatus;

pub fn render_index(template_root: &str, name: &str) -> Result<HttpResponse, HandlerError> {
    let html = render(template_root, "index.html", name)?;

    let mut res = HttpResponse::new();
    res.status = HttpStatus::Ok;
    res.set_header(ResponseHeader::ContentType, "text/html");
    res.set_body(html.into_bytes());
    Ok(res)
}

fn render(template_root: &str, template: &str, name: &str) -> Result<String, HandlerError> {
    let mut env = Environment::new();
    env.set_loader(path_loader(template_root));

    let template = env.get_template(template).map_err(HandlerError::Render)?;
    template.render(context! { name }).map_err(HandlerError::Render)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::body::Body;

    #[test]
    fn renders_the_name_into_the_page() {
        let res = render_index("./templates", "Subbu").unwrap();

        assert_eq!(res.status, HttpStatus::Ok);
        let body = match res.body {
            Body::Full(bytes) => String::from_utf8(bytes).unwrap(),
            _ => panic!("rendered page should be buffered"),
        };
        assert!(body.contains("Subbu"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let first = render("./templates", "index.html", "Subbu").unwrap();
        let second = render("./templates", "index.html", "Subbu").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_template_is_propagated() {
        let err = render("./templates", "absent.html", "Subbu").unwrap_err();
        assert!(matches!(err, HandlerError::Render(_)));
    }
}
