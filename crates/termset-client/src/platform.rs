//! Translation platform client.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::{debug, info};

use termset_core::error::AppError;
use termset_core::result::AppResult;
use termset_entity::platform::{Label, Unit, UnitPage, UnitQuery, UnitTranslation};
use termset_entity::{PLATFORM_COMPONENT, PLATFORM_PROJECT};

use crate::http::{ACTING_USER_HEADER, check_status, read_json, transport_error};
use crate::traits::TranslationPlatformClient;

const NEW_LABEL_COLOR: &str = "blue";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkAddLabelRequest<'a> {
    project: &'a str,
    label_id: i64,
    context_ids: &'a [String],
}

#[derive(Debug, Serialize)]
struct NewLabel<'a> {
    name: &'a str,
    description: &'a str,
    color: &'a str,
}

/// reqwest client for the translation platform API.
#[derive(Debug, Clone)]
pub struct HttpPlatformClient {
    http: reqwest::Client,
    api_url: String,
    web_url: String,
    token: String,
    acting_user: String,
}

impl HttpPlatformClient {
    /// Client against `api_url` acting for `acting_user`.
    pub fn new(
        http: reqwest::Client,
        api_url: impl Into<String>,
        web_url: impl Into<String>,
        token: impl Into<String>,
        acting_user: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            web_url: web_url.into(),
            token: token.into(),
            acting_user: acting_user.into(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.request_url(method, &format!("{}{}", self.api_url, path))
    }

    fn request_url(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.token))
            .header(ACTING_USER_HEADER, &self.acting_user)
    }

    /// Every label of `project`, following `next` across pages.
    async fn list_labels(&self, project: &str) -> AppResult<Vec<Label>> {
        let what = "Label listing";
        let mut labels = Vec::new();
        let mut request = self
            .request(reqwest::Method::GET, &format!("/projects/{project}/labels/"))
            .query(&[("format", "json")]);
        loop {
            let response = request
                .send()
                .await
                .map_err(|e| transport_error(what, e))?;
            let response = check_status(response, what).await?;
            let page: UnitPage<Label> = read_json(response, what).await?;
            labels.extend(page.results);
            match page.next {
                Some(next) => request = self.request_url(reqwest::Method::GET, &next),
                None => break,
            }
        }
        debug!("Listed {} labels of project {}", labels.len(), project);
        Ok(labels)
    }
}

/// `(context, suggestion)` rows, every first-ranked suggestion before any
/// second-ranked one.
fn ranked_rows(translations: &[UnitTranslation]) -> Vec<(&str, &str)> {
    let ranks = translations
        .iter()
        .map(|t| t.suggestions.len())
        .max()
        .unwrap_or(0);
    (0..ranks)
        .flat_map(|rank| {
            translations.iter().filter_map(move |t| {
                t.suggestions
                    .get(rank)
                    .map(|s| (t.context.as_str(), s.as_str()))
            })
        })
        .collect()
}

/// Render `(context, text)` rows as a two-column CSV upload.
fn suggestion_csv<'a>(rows: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let quote = |value: &str| format!("\"{}\"", value.replace('"', "\"\""));
    let mut csv = String::from("\"context\",\"target\"\n");
    for (context, text) in rows {
        csv.push_str(&quote(context));
        csv.push(',');
        csv.push_str(&quote(text));
        csv.push('\n');
    }
    csv
}

#[async_trait]
impl TranslationPlatformClient for HttpPlatformClient {
    async fn get_unit_page(&self, query: &UnitQuery) -> AppResult<UnitPage<Unit>> {
        let what = "Unit search";
        debug!("Unit search: {}", query.search_expression());
        let response = self
            .request(reqwest::Method::GET, "/units/")
            .query(&query.to_params())
            .send()
            .await
            .map_err(|e| transport_error(what, e))?;
        let response = check_status(response, what).await?;
        read_json(response, what).await
    }

    async fn bulk_add_label(
        &self,
        project: &str,
        label_id: i64,
        context_ids: &[String],
    ) -> AppResult<()> {
        let what = "Bulk label";
        let response = self
            .request(reqwest::Method::POST, "/units/bulk_add_label/")
            .json(&BulkAddLabelRequest {
                project,
                label_id,
                context_ids,
            })
            .send()
            .await
            .map_err(|e| transport_error(what, e))?;
        check_status(response, what).await?;
        Ok(())
    }

    async fn upload_translations(
        &self,
        language_code_with_refset: &str,
        translations: &[UnitTranslation],
    ) -> AppResult<()> {
        let what = "Suggestion upload";
        let rows = ranked_rows(translations);
        if rows.is_empty() {
            return Ok(());
        }

        // The component is multi-value CSV, so a context may repeat: one row
        // per suggestion, all added without touching unit state.
        let part = Part::text(suggestion_csv(rows.into_iter()))
            .file_name("suggestions.csv")
            .mime_str("text/csv")
            .map_err(|e| transport_error(what, e))?;
        let form = Form::new()
            .text("method", "suggest")
            .text("conflicts", "ignore")
            .part("file", part);

        let response = self
            .request(
                reqwest::Method::POST,
                &format!(
                    "/translations/{PLATFORM_PROJECT}/{PLATFORM_COMPONENT}/{language_code_with_refset}/file/"
                ),
            )
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(what, e))?;
        check_status(response, what).await?;
        info!(
            "Uploaded suggestions for {} units to {}",
            translations.len(),
            language_code_with_refset
        );
        Ok(())
    }

    async fn get_create_label(
        &self,
        project: &str,
        name: &str,
        description: &str,
    ) -> AppResult<Label> {
        if let Some(existing) = self.get_label(project, name).await? {
            return Ok(existing);
        }

        let what = "Label creation";
        let response = self
            .request(reqwest::Method::POST, &format!("/projects/{project}/labels/"))
            .json(&NewLabel {
                name,
                description,
                color: NEW_LABEL_COLOR,
            })
            .send()
            .await
            .map_err(|e| transport_error(what, e))?;
        check_status(response, what).await?;

        self.get_label(project, name)
            .await?
            .ok_or_else(|| AppError::external(format!("Label '{name}' missing after creation")))
    }

    async fn get_label(&self, project: &str, name: &str) -> AppResult<Option<Label>> {
        Ok(self
            .list_labels(project)
            .await?
            .into_iter()
            .find(|label| label.name == name))
    }

    async fn delete_label(&self, project: &str, name: &str) -> AppResult<()> {
        let Some(label) = self.get_label(project, name).await? else {
            debug!("Label {} already absent", name);
            return Ok(());
        };
        let what = "Label deletion";
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("/projects/{project}/labels/{}/", label.id),
            )
            .send()
            .await
            .map_err(|e| transport_error(what, e))?;
        check_status(response, what).await?;
        Ok(())
    }

    async fn translation_exists(&self, language_code_with_refset: &str) -> AppResult<bool> {
        let what = "Translation lookup";
        let response = self
            .request(
                reqwest::Method::GET,
                &format!(
                    "/translations/{PLATFORM_PROJECT}/{PLATFORM_COMPONENT}/{language_code_with_refset}/"
                ),
            )
            .send()
            .await
            .map_err(|e| transport_error(what, e))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response, what).await?;
        Ok(true)
    }

    fn web_url(&self) -> String {
        self.web_url.clone()
    }
}
