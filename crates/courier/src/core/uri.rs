use crate::data::{FetcherConfig, RequestInit};
use crate::error::Result;

/// Join the URI parts. A query, even an empty one, is always introduced by `?`.
///
/// # Examples
///
/// ```
/// use courier::core::compose_uri;
///
/// assert_eq!(compose_uri(Some("/api/"), Some("users"), None), "/api/users");
/// assert_eq!(compose_uri(Some("/api/"), None, Some("")), "/api/?");
/// assert_eq!(compose_uri(None, None, None), "");
/// ```
pub fn compose_uri(base: Option<&str>, path: Option<&str>, query: Option<&str>) -> String {
    let mut uri = base.unwrap_or_default().to_string();
    if let Some(path) = path {
        uri.push_str(path);
    }
    if let Some(query) = query {
        uri.push('?');
        uri.push_str(query);
    }
    uri
}

/// Run the builder callbacks for one call.
///
/// Returns the final URI and the request descriptor seeded from the base
/// request. Builders run in order: URI, query, body.
pub fn prepare_request<A>(config: &FetcherConfig<A>, args: &A) -> Result<(String, RequestInit)> {
    let mut request = config.request.clone();

    let path = config.build_uri.as_ref().map(|build| build(&mut request, args));
    let query = config
        .build_query
        .as_ref()
        .map(|build| build(&mut request, args).into_query_string());

    if let Some(build) = &config.build_body
        && let Some(body) = build(&mut request, args)?.into_request_body()
    {
        request.body = Some(body);
    }

    let uri = compose_uri(config.base.as_deref(), path.as_deref(), query.as_deref());
    Ok((uri, request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FormValue, RequestBody};
    use serde_json::json;

    #[test]
    fn test_no_builders_uses_base_exactly() {
        let config = FetcherConfig::<()>::new().base("https://example.com/api/");
        let (uri, request) = prepare_request(&config, &()).unwrap();
        assert_eq!(uri, "https://example.com/api/");
        assert_eq!(request, RequestInit::default());
    }

    #[test]
    fn test_no_base_is_empty() {
        let config = FetcherConfig::<()>::new();
        let (uri, _) = prepare_request(&config, &()).unwrap();
        assert_eq!(uri, "");
    }

    #[test]
    fn test_uri_builder_appends_to_base() {
        let config = FetcherConfig::<(&'static str, u32)>::new()
            .base("/api/1.0/")
            .build_uri(|_, (resource, id)| format!("{resource}/{id}"));

        let (uri, _) = prepare_request(&config, &("get-user", 12)).unwrap();
        assert_eq!(uri, "/api/1.0/get-user/12");
    }

    #[test]
    fn test_query_params_are_encoded() {
        let config = FetcherConfig::<String>::new()
            .base("/search")
            .build_query(|_, term: &String| json!({ "q": term, "page": 1 }));

        let (uri, _) = prepare_request(&config, &"rust & tokio".to_string()).unwrap();
        assert_eq!(uri, "/search?q=rust+%26+tokio&page=1");
    }

    #[test]
    fn test_empty_query_keeps_question_mark() {
        let config = FetcherConfig::<()>::new().base("/items").build_query(|_, _| "");
        let (uri, _) = prepare_request(&config, &()).unwrap();
        assert_eq!(uri, "/items?");
    }

    #[test]
    fn test_builders_share_the_request() {
        let config = FetcherConfig::<u32>::new()
            .request(RequestInit::default().with_header("Accept", "application/json"))
            .build_uri(|request, id| {
                request.method = "POST".to_string();
                format!("/users/{id}")
            })
            .build_body(|request, id| {
                assert_eq!(request.method, "POST");
                json!({ "id": id })
            });

        let (uri, request) = prepare_request(&config, &7).unwrap();
        assert_eq!(uri, "/users/7");
        assert_eq!(request.method, "POST");
        assert_eq!(request.header("accept"), Some("application/json"));
        let Some(RequestBody::Form(form)) = request.body else {
            panic!("expected a form body");
        };
        assert_eq!(form.get("id").and_then(FormValue::as_text), Some("7"));
    }

    #[test]
    fn test_base_request_is_not_mutated() {
        let config = FetcherConfig::<()>::new().build_uri(|request, _| {
            request.set_header("X-Once", "1");
            "/x"
        });

        let (_, first) = prepare_request(&config, &()).unwrap();
        let (_, second) = prepare_request(&config, &()).unwrap();
        assert_eq!(first.headers.len(), 1);
        assert_eq!(second.headers.len(), 1);
        assert!(config.request.headers.is_empty());
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let config = FetcherConfig::<u32>::new().build_json_body(|_, id| json!({ "id": id }));

        let (_, request) = prepare_request(&config, &3).unwrap();
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body, Some(RequestBody::Text(r#"{"id":3}"#.to_string())));
    }

    #[test]
    fn test_scalar_body_leaves_base_body() {
        let config = FetcherConfig::<()>::new()
            .request(RequestInit::default().with_body("seed"))
            .build_body(|_, _| json!(1));

        let (_, request) = prepare_request(&config, &()).unwrap();
        assert_eq!(request.body, Some(RequestBody::Text("seed".to_string())));
    }
}
