use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::{ApiDraft, DataType, KeyValue};

// Postman collection v2.0 / v2.1, only the parts that map onto a draft

#[derive(Debug, Deserialize)]
struct Collection {
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    name: Option<String>,
    /// Present on folders
    #[serde(default)]
    item: Option<Vec<Item>>,
    #[serde(default)]
    request: Option<Request>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Request {
    Url(String),
    Full(RequestDetail),
}

#[derive(Debug, Deserialize)]
struct RequestDetail {
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    header: Vec<Pair>,
    #[serde(default)]
    url: Option<Url>,
    #[serde(default)]
    body: Option<Body>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Url {
    Raw(String),
    Detail {
        #[serde(default)]
        raw: Option<String>,
        #[serde(default)]
        query: Vec<Pair>,
    },
}

#[derive(Debug, Deserialize)]
struct Pair {
    key: String,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    disabled: bool,
}

#[derive(Debug, Deserialize)]
struct Body {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    raw: Option<String>,
    #[serde(default)]
    urlencoded: Vec<Pair>,
    #[serde(default)]
    formdata: Vec<Pair>,
    #[serde(default)]
    graphql: Option<GraphqlBody>,
}

#[derive(Debug, Deserialize)]
struct GraphqlBody {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    variables: Option<Value>,
}

fn text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn enabled(pairs: Vec<Pair>) -> Vec<KeyValue> {
    pairs
        .into_iter()
        .filter(|pair| !pair.disabled)
        .map(|pair| KeyValue::new(pair.key, pair.value.map(text).unwrap_or_default()))
        .collect()
}

/// One draft per request item, folders walked depth-first
pub fn parse(file: &str, bytes: &[u8]) -> AppResult<Vec<ApiDraft>> {
    let collection: Collection = serde_json::from_slice(bytes)
        .map_err(|e| AppError::import(file, format!("not a Postman collection ({e})")))?;

    let mut drafts = Vec::new();
    walk(collection.item, None, &mut drafts);
    Ok(drafts)
}

fn walk(items: Vec<Item>, category: Option<&str>, drafts: &mut Vec<ApiDraft>) {
    for item in items {
        match (item.item, item.request) {
            (Some(children), _) => {
                // the outermost folder names the category
                let folder = item.name.as_deref();
                walk(children, category.or(folder), drafts);
            }
            (None, Some(request)) => {
                drafts.push(to_draft(item.name, request, category));
            }
            (None, None) => {}
        }
    }
}

fn to_draft(name: Option<String>, request: Request, category: Option<&str>) -> ApiDraft {
    let mut draft = ApiDraft {
        name: name.clone(),
        description: name,
        category: category.map(str::to_string),
        ..Default::default()
    };

    let detail = match request {
        Request::Url(url) => {
            draft.endpoint = Some(url);
            draft.method = Some("GET".to_string());
            draft.example_integration = Some(curl_command(&draft));
            return draft;
        }
        Request::Full(detail) => detail,
    };

    draft.method = Some(
        detail
            .method
            .map(|m| m.to_ascii_uppercase())
            .unwrap_or_else(|| "GET".to_string()),
    );
    draft.headers = enabled(detail.header);

    match detail.url {
        Some(Url::Raw(raw)) => draft.endpoint = Some(raw),
        Some(Url::Detail { raw, query }) => {
            draft.endpoint = raw;
            draft.query_params = enabled(query);
        }
        None => {}
    }

    if let Some(body) = detail.body {
        apply_body(&mut draft, body);
    }

    draft.example_integration = Some(curl_command(&draft));
    draft
}

fn apply_body(draft: &mut ApiDraft, body: Body) {
    match body.mode.as_deref() {
        Some("urlencoded") => {
            draft.data_type = Some(DataType::UrlEncoded);
            draft.form_data = enabled(body.urlencoded);
        }
        Some("formdata") => {
            draft.data_type = Some(DataType::FormData);
            draft.form_data = enabled(body.formdata);
        }
        Some("graphql") => {
            draft.data_type = Some(DataType::Graphql);
            if let Some(graphql) = body.graphql {
                draft.graphql_query = graphql.query;
                draft.graphql_variables = graphql.variables.map(text).filter(|v| !v.is_empty());
            }
        }
        Some("file") => draft.data_type = Some(DataType::Binary),
        _ => {
            draft.request_body = body.raw.filter(|raw| !raw.trim().is_empty());
            if draft.request_body.is_some() {
                draft.data_type = Some(DataType::Raw);
            }
        }
    }
}

/// `curl -X <METHOD> <url> -H "<k>: <v>"... -d '<raw>'`
pub fn curl_command(draft: &ApiDraft) -> String {
    let mut command = format!(
        "curl -X {} {}",
        draft.method.as_deref().unwrap_or("GET"),
        draft.endpoint.as_deref().unwrap_or_default()
    );
    for header in &draft.headers {
        command.push_str(&format!(" -H \"{}: {}\"", header.key, header.value));
    }
    if let Some(raw) = &draft.request_body {
        command.push_str(&format!(" -d '{}'", raw));
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_value(value: Value) -> Vec<ApiDraft> {
        parse("collection.json", value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_ping_item() {
        let drafts = parse_value(json!({
            "info": {"name": "Demo"},
            "item": [{
                "name": "Ping",
                "request": {
                    "method": "GET",
                    "url": {"raw": "https://x/y"},
                    "header": [{"key": "Authorization", "value": "Bearer t"}]
                }
            }]
        }));

        assert_eq!(drafts.len(), 1);
        let ping = &drafts[0];
        assert_eq!(ping.name.as_deref(), Some("Ping"));
        assert_eq!(ping.description.as_deref(), Some("Ping"));
        assert_eq!(ping.endpoint.as_deref(), Some("https://x/y"));
        assert_eq!(ping.method.as_deref(), Some("GET"));
        assert_eq!(ping.headers, vec![KeyValue::new("Authorization", "Bearer t")]);

        let curl = ping.example_integration.as_deref().unwrap();
        assert!(curl.contains("curl -X GET https://x/y"));
        assert!(curl.contains("-H \"Authorization: Bearer t\""));
    }

    #[test]
    fn test_folders_and_bodies() {
        let drafts = parse_value(json!({
            "item": [{
                "name": "Users",
                "item": [
                    {
                        "name": "Create",
                        "request": {
                            "method": "post",
                            "url": "https://api/users",
                            "header": [
                                {"key": "Content-Type", "value": "application/json"},
                                {"key": "X-Debug", "value": "1", "disabled": true}
                            ],
                            "body": {"mode": "raw", "raw": "{\"name\": \"a\"}"}
                        }
                    },
                    {
                        "name": "Nested",
                        "item": [{
                            "name": "Login",
                            "request": {
                                "url": {"raw": "https://api/login", "query": [{"key": "next", "value": "/home"}]},
                                "body": {"mode": "urlencoded", "urlencoded": [{"key": "user", "value": "u"}]}
                            }
                        }]
                    }
                ]
            }, {
                "name": "Health",
                "request": "https://api/health"
            }]
        }));

        assert_eq!(drafts.len(), 3);

        let create = &drafts[0];
        assert_eq!(create.category.as_deref(), Some("Users"));
        assert_eq!(create.method.as_deref(), Some("POST"));
        assert_eq!(create.headers.len(), 1);
        assert_eq!(create.request_body.as_deref(), Some("{\"name\": \"a\"}"));
        assert!(create
            .example_integration
            .as_deref()
            .unwrap()
            .ends_with("-d '{\"name\": \"a\"}'"));

        let login = &drafts[1];
        assert_eq!(login.category.as_deref(), Some("Users"));
        assert_eq!(login.method.as_deref(), Some("GET"));
        assert_eq!(login.query_params, vec![KeyValue::new("next", "/home")]);
        assert_eq!(login.data_type, Some(DataType::UrlEncoded));
        assert_eq!(login.form_data, vec![KeyValue::new("user", "u")]);

        let health = &drafts[2];
        assert_eq!(health.category, None);
        assert_eq!(health.endpoint.as_deref(), Some("https://api/health"));
    }

    #[test]
    fn test_graphql_body() {
        let drafts = parse_value(json!({
            "item": [{
                "name": "Query",
                "request": {
                    "method": "POST",
                    "url": "https://api/graphql",
                    "body": {"mode": "graphql", "graphql": {"query": "{ me { id } }", "variables": "{\"a\": 1}"}}
                }
            }]
        }));

        assert_eq!(drafts[0].data_type, Some(DataType::Graphql));
        assert_eq!(drafts[0].graphql_query.as_deref(), Some("{ me { id } }"));
        assert_eq!(drafts[0].graphql_variables.as_deref(), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_not_a_collection() {
        let err = parse("x.json", br#"{"hello": "world"}"#).unwrap_err();
        assert!(err.to_string().contains("x.json"));
    }
}
