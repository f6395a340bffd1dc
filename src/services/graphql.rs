use graphql_client::{GraphQLQuery, Response};
use serde::de::DeserializeOwned;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::request::Request;

/// Typed GraphQL access over `/graphql`.
///
/// Queries are declared with `#[derive(GraphQLQuery)]` in the calling crate.
#[derive(Debug, Clone)]
pub struct Graphql {
    client: Client,
}

impl Graphql {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn query<T>(&self, variables: T::Variables) -> Result<T::ResponseData>
    where
        T: GraphQLQuery,
        T::Variables: serde::Serialize,
        T::ResponseData: DeserializeOwned,
    {
        self.execute::<T>("/graphql", variables).await
    }

    pub async fn mutation<T>(&self, variables: T::Variables) -> Result<T::ResponseData>
    where
        T: GraphQLQuery,
        T::Variables: serde::Serialize,
        T::ResponseData: DeserializeOwned,
    {
        self.execute::<T>("/graphql/mutation", variables).await
    }

    async fn execute<T>(&self, path: &str, variables: T::Variables) -> Result<T::ResponseData>
    where
        T: GraphQLQuery,
        T::Variables: serde::Serialize,
        T::ResponseData: DeserializeOwned,
    {
        let body = T::build_query(variables);

        let request = Request::post(path)
            .header("x-sdk-graphql", "true")
            .param("query", body.query)
            .param("operationName", body.operation_name)
            .param("variables", serde_json::to_value(&body.variables)?);

        let response: Response<T::ResponseData> = self.client.call_json(request).await?;

        match response.data {
            Some(data) => Ok(data),
            None => Err(Error::Graphql(response.errors.unwrap_or_default())),
        }
    }
}
