//! Executes `features/products.feature` against a live server.
//!
//! Each scenario gets its own server; the background runs before every scenario.
//! Step text is matched with its quoted arguments replaced by `{}`.

use catalog_api::app::{AppServices, build_app};
use reqwest::StatusCode;
use serde_json::{Map, Value, json};

const FEATURE: &str = include_str!("features/products.feature");

#[derive(Debug, Clone)]
struct Step {
    keyword: String,
    text: String,
    table: Vec<Vec<String>>,
}

#[derive(Debug)]
struct Scenario {
    name: String,
    steps: Vec<Step>,
}

#[derive(Debug, Default)]
struct Feature {
    name: String,
    background: Vec<Step>,
    scenarios: Vec<Scenario>,
}

const KEYWORDS: [&str; 5] = ["Given", "When", "Then", "And", "But"];

fn parse_feature(source: &str) -> Feature {
    let mut feature = Feature::default();
    let mut in_background = false;

    for line in source.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix("Feature:") {
            feature.name = name.trim().to_string();
        } else if line.starts_with("Background:") {
            in_background = true;
        } else if let Some(name) = line.strip_prefix("Scenario:") {
            in_background = false;
            feature.scenarios.push(Scenario {
                name: name.trim().to_string(),
                steps: Vec::new(),
            });
        } else if line.starts_with('|') {
            let row = line
                .trim_matches('|')
                .split('|')
                .map(|cell| cell.trim().to_string())
                .collect();
            let steps = if in_background {
                &mut feature.background
            } else {
                &mut feature.scenarios.last_mut().expect("table outside scenario").steps
            };
            steps.last_mut().expect("table without step").table.push(row);
        } else if let Some(keyword) = KEYWORDS
            .iter()
            .find(|k| line.starts_with(&format!("{k} ")))
        {
            let step = Step {
                keyword: keyword.to_string(),
                text: line[keyword.len()..].trim().to_string(),
                table: Vec::new(),
            };
            if in_background {
                feature.background.push(step);
            } else if let Some(scenario) = feature.scenarios.last_mut() {
                scenario.steps.push(step);
            }
        }
        // Anything else is free-form feature narrative.
    }

    feature
}

/// Split step text into a pattern and its quoted arguments.
fn pattern_and_args(text: &str) -> (String, Vec<String>) {
    let mut pattern = String::new();
    let mut args = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find('"') {
        let Some(len) = rest[start + 1..].find('"') else {
            break;
        };
        pattern.push_str(&rest[..start]);
        pattern.push_str("{}");
        args.push(rest[start + 1..start + 1 + len].to_string());
        rest = &rest[start + len + 2..];
    }
    pattern.push_str(rest);

    (pattern, args)
}

/// Rows of a Gherkin table as JSON product bodies (header row gives the keys).
fn table_to_products(table: &[Vec<String>]) -> Vec<Value> {
    let Some((header, rows)) = table.split_first() else {
        return Vec::new();
    };
    rows.iter()
        .map(|row| {
            let mut body = Map::new();
            for (key, cell) in header.iter().zip(row) {
                let value = match key.as_str() {
                    "available" => Value::Bool(cell.eq_ignore_ascii_case("true")),
                    _ => Value::String(cell.clone()),
                };
                body.insert(key.clone(), value);
            }
            Value::Object(body)
        })
        .collect()
}

/// Text form of a JSON scalar as written in the feature file.
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

struct World {
    client: reqwest::Client,
    base_url: String,
    server: tokio::task::JoinHandle<()>,
    status: Option<StatusCode>,
    body: Value,
    product_id: Option<String>,
}

impl World {
    async fn new() -> Self {
        let app = build_app(AppServices::in_memory());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            client: reqwest::Client::new(),
            base_url,
            server,
            status: None,
            body: Value::Null,
            product_id: None,
        }
    }

    async fn record(&mut self, res: reqwest::Response) {
        self.status = Some(res.status());
        let text = res.text().await.unwrap_or_default();
        self.body = serde_json::from_str(&text).unwrap_or(Value::Null);
    }

    async fn search(&mut self, query: &[(&str, &str)]) {
        let res = self
            .client
            .get(format!("{}/products", self.base_url))
            .query(query)
            .send()
            .await
            .unwrap();
        self.record(res).await;
    }

    async fn id_of(&self, name: &str) -> Result<String, String> {
        let found: Vec<Value> = self
            .client
            .get(format!("{}/products", self.base_url))
            .query(&[("name", name)])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        found
            .first()
            .and_then(|p| p["id"].as_str())
            .map(str::to_string)
            .ok_or_else(|| format!("no product named {name:?}"))
    }

    fn results(&self) -> Result<&Vec<Value>, String> {
        self.body
            .as_array()
            .ok_or_else(|| format!("expected a list of products, got {}", self.body))
    }

    fn results_mention(&self, text: &str) -> Result<bool, String> {
        Ok(self.results()?.iter().any(|p| {
            p.as_object()
                .is_some_and(|fields| fields.values().any(|v| v.as_str() == Some(text)))
        }))
    }

    async fn run(&mut self, step: &Step) -> Result<(), String> {
        let (pattern, args) = pattern_and_args(&step.text);
        let arg = |i: usize| args[i].as_str();

        match pattern.as_str() {
            "the following products" => {
                let existing: Vec<Value> = self
                    .client
                    .get(format!("{}/products", self.base_url))
                    .send()
                    .await
                    .unwrap()
                    .json()
                    .await
                    .unwrap();
                for product in existing {
                    let id = product["id"].as_str().unwrap_or_default();
                    self.client
                        .delete(format!("{}/products/{id}", self.base_url))
                        .send()
                        .await
                        .unwrap();
                }
                for body in table_to_products(&step.table) {
                    let res = self
                        .client
                        .post(format!("{}/products", self.base_url))
                        .json(&body)
                        .send()
                        .await
                        .unwrap();
                    if res.status() != StatusCode::CREATED {
                        return Err(format!("failed to load {body}: {}", res.status()));
                    }
                }
                Ok(())
            }
            "I create a product with" => {
                let body = table_to_products(&step.table)
                    .into_iter()
                    .next()
                    .ok_or("step needs a table with one product")?;
                let res = self
                    .client
                    .post(format!("{}/products", self.base_url))
                    .json(&body)
                    .send()
                    .await
                    .unwrap();
                self.record(res).await;
                self.product_id = self.body["id"].as_str().map(str::to_string);
                Ok(())
            }
            "I list all products" => {
                self.search(&[]).await;
                Ok(())
            }
            "I search for products with name {}" => {
                self.search(&[("name", arg(0))]).await;
                Ok(())
            }
            "I search for products in category {}" => {
                self.search(&[("category", arg(0))]).await;
                Ok(())
            }
            "I search for products with availability {}" => {
                self.search(&[("available", arg(0))]).await;
                Ok(())
            }
            "I retrieve the product named {}" => {
                let id = self.id_of(arg(0)).await?;
                let res = self
                    .client
                    .get(format!("{}/products/{id}", self.base_url))
                    .send()
                    .await
                    .unwrap();
                self.record(res).await;
                self.product_id = Some(id);
                Ok(())
            }
            "I retrieve the product by its id" => {
                let id = self.product_id.clone().ok_or("no product id remembered")?;
                let res = self
                    .client
                    .get(format!("{}/products/{id}", self.base_url))
                    .send()
                    .await
                    .unwrap();
                self.record(res).await;
                Ok(())
            }
            "I update the product named {} setting {} to {}" => {
                let id = self.id_of(arg(0)).await?;
                let res = self
                    .client
                    .put(format!("{}/products/{id}", self.base_url))
                    .json(&json!({ arg(1): arg(2) }))
                    .send()
                    .await
                    .unwrap();
                self.record(res).await;
                self.product_id = Some(id);
                Ok(())
            }
            "I delete the product named {}" => {
                let id = self.id_of(arg(0)).await?;
                let res = self
                    .client
                    .delete(format!("{}/products/{id}", self.base_url))
                    .send()
                    .await
                    .unwrap();
                self.record(res).await;
                self.product_id = Some(id);
                Ok(())
            }
            "the response status should be {}" => {
                let expected: u16 = arg(0).parse().map_err(|e| format!("bad status: {e}"))?;
                match self.status {
                    Some(s) if s.as_u16() == expected => Ok(()),
                    other => Err(format!("expected status {expected}, got {other:?}")),
                }
            }
            "the results should contain {} products" => {
                let expected: usize = arg(0).parse().map_err(|e| format!("bad count: {e}"))?;
                let actual = self.results()?.len();
                if actual == expected {
                    Ok(())
                } else {
                    Err(format!("expected {expected} products, got {actual}"))
                }
            }
            "I should see {} in the results" => {
                if self.results_mention(arg(0))? {
                    Ok(())
                } else {
                    Err(format!("{:?} not found in {}", arg(0), self.body))
                }
            }
            "I should not see {} in the results" => {
                if self.results_mention(arg(0))? {
                    Err(format!("{:?} unexpectedly found in {}", arg(0), self.body))
                } else {
                    Ok(())
                }
            }
            "the product should have {} equal to {}" => {
                let actual = as_text(&self.body[arg(0)]);
                if actual == arg(1) {
                    Ok(())
                } else {
                    Err(format!("expected {} = {:?}, got {actual:?}", arg(0), arg(1)))
                }
            }
            "every result should have {} equal to {}" => {
                for product in self.results()? {
                    let actual = as_text(&product[arg(0)]);
                    if actual != arg(1) {
                        return Err(format!("expected {} = {:?}, got {actual:?}", arg(0), arg(1)));
                    }
                }
                Ok(())
            }
            _ => Err(format!("no step definition matches {:?}", step.text)),
        }
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.server.abort();
    }
}

#[test]
fn feature_file_parses() {
    let feature = parse_feature(FEATURE);
    assert_eq!(feature.name, "The product store service back-end");
    assert_eq!(feature.background.len(), 1);
    assert_eq!(feature.background[0].table.len(), 5);

    let names: Vec<&str> = feature.scenarios.iter().map(|s| s.name.as_str()).collect();
    for required in [
        "Read a Product",
        "Update a Product",
        "Delete a Product",
        "List all products",
        "Search by name",
        "Search by category",
        "Search by available",
    ] {
        assert!(names.contains(&required), "missing scenario {required:?}");
    }
}

#[test]
fn step_text_is_split_into_pattern_and_arguments() {
    let (pattern, args) =
        pattern_and_args(r#"I update the product named "Hat" setting "description" to "A blue fedora""#);
    assert_eq!(pattern, "I update the product named {} setting {} to {}");
    assert_eq!(args, vec!["Hat", "description", "A blue fedora"]);

    let (pattern, args) = pattern_and_args("I list all products");
    assert_eq!(pattern, "I list all products");
    assert!(args.is_empty());
}

#[tokio::test]
async fn products_feature_scenarios_pass() {
    let feature = parse_feature(FEATURE);
    let mut failures = Vec::new();

    for scenario in &feature.scenarios {
        let mut world = World::new().await;
        for step in feature.background.iter().chain(&scenario.steps) {
            if let Err(reason) = world.run(step).await {
                failures.push(format!(
                    "{}: {} {}: {reason}",
                    scenario.name, step.keyword, step.text
                ));
                break;
            }
        }
    }

    assert!(failures.is_empty(), "failing steps:\n{}", failures.join("\n"));
}
