use anyhow::Context;
use bytes::Bytes;
use itertools::Itertools;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};

#[derive(Clone)]
pub struct GithubClient {
    token: SecretString,
    client: Client,
    pub(crate) api_url: String,
    graphql_url: String,
}

impl GithubClient {
    pub fn new(token: SecretString, api_url: String, graphql_url: String) -> Self {
        GithubClient {
            client: Client::new(),
            token,
            api_url,
            graphql_url,
        }
    }

    /// Builds a client from the workflow environment.
    ///
    /// The token comes from the `github_token` action input (with a
    /// `GITHUB_TOKEN` fallback); the API URLs are the ones the Actions runner
    /// exports, so GHES deployments are picked up automatically.
    pub fn new_from_env() -> anyhow::Result<Self> {
        Ok(Self::new(
            crate::config::github_token()?,
            std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            std::env::var("GITHUB_GRAPHQL_URL")
                .unwrap_or_else(|_| "https://api.github.com/graphql".to_string()),
        ))
    }

    pub(crate) async fn send_req(&self, req: RequestBuilder) -> anyhow::Result<(Bytes, String)> {
        tracing::debug!("send_req with {:?}", req);
        let req_dbg = format!("{req:?}");
        let req = req
            .build()
            .with_context(|| format!("building reqwest {req_dbg}"))?;

        let resp = self.client.execute(req).await?;
        let maybe_err = resp.error_for_status_ref().err();
        let body = resp
            .bytes()
            .await
            .with_context(|| format!("failed to read response body {req_dbg}"))?;
        if let Some(e) = maybe_err {
            return Err(anyhow::Error::new(e))
                .with_context(|| format!("response: {}", String::from_utf8_lossy(&body)));
        }

        Ok((body, req_dbg))
    }

    pub async fn json<T>(&self, req: RequestBuilder) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let (body, _req_dbg) = self.send_req(req).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        tracing::trace!("get {:?}", url);
        self.client.get(url).configure(self)
    }

    pub(crate) fn patch(&self, url: &str) -> RequestBuilder {
        tracing::trace!("patch {:?}", url);
        self.client.patch(url).configure(self)
    }

    pub(crate) fn delete(&self, url: &str) -> RequestBuilder {
        tracing::trace!("delete {:?}", url);
        self.client.delete(url).configure(self)
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        tracing::trace!("post {:?}", url);
        self.client.post(url).configure(self)
    }

    /// Issues an ad-hoc GraphQL query.
    ///
    /// You are responsible for checking the `errors` array when calling this
    /// function to determine if there is an error. Use
    /// [`GithubClient::graphql_query`] if you would prefer to have a generic
    /// error message.
    pub async fn graphql_query_with_errors(
        &self,
        query: &str,
        vars: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        self.json(self.post(&self.graphql_url).json(&serde_json::json!({
            "query": query,
            "variables": vars,
        })))
        .await
    }

    /// Issues an ad-hoc GraphQL query, failing if the response carries any
    /// `errors`.
    pub async fn graphql_query(
        &self,
        query: &str,
        vars: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        let result: serde_json::Value = self.graphql_query_with_errors(query, vars).await?;
        if let Some(errors) = result["errors"].as_array() {
            let messages = errors
                .iter()
                .map(|err| err["message"].as_str().unwrap_or_default())
                .format("\n");
            anyhow::bail!("error: {messages}");
        }
        Ok(result)
    }
}

trait RequestSend: Sized {
    fn configure(self, g: &GithubClient) -> Self;
}

impl RequestSend for RequestBuilder {
    fn configure(self, g: &GithubClient) -> RequestBuilder {
        let mut auth = reqwest::header::HeaderValue::from_maybe_shared(format!(
            "token {}",
            g.token.expose_secret()
        ))
        .unwrap();
        auth.set_sensitive(true);
        self.header(USER_AGENT, "gardenbot")
            .header(AUTHORIZATION, &auth)
    }
}
