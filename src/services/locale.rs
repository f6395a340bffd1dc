use crate::client::Client;
use crate::error::Result;
use crate::models::{
    ContinentList, CountryList, CurrencyList, LanguageList, Locale as LocaleInfo, LocaleCodeList,
};
use crate::request::Request;

#[derive(Debug, Clone)]
pub struct Locale {
    client: Client,
}

impl Locale {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Location of the caller, resolved from its IP.
    pub async fn get(&self) -> Result<LocaleInfo> {
        self.client.call_json(Request::get("/locale")).await
    }

    pub async fn list_codes(&self) -> Result<LocaleCodeList> {
        self.client.call_json(Request::get("/locale/codes")).await
    }

    pub async fn list_continents(&self) -> Result<ContinentList> {
        self.client.call_json(Request::get("/locale/continents")).await
    }

    pub async fn list_countries(&self) -> Result<CountryList> {
        self.client.call_json(Request::get("/locale/countries")).await
    }

    pub async fn list_countries_eu(&self) -> Result<CountryList> {
        self.client.call_json(Request::get("/locale/countries/eu")).await
    }

    pub async fn list_currencies(&self) -> Result<CurrencyList> {
        self.client.call_json(Request::get("/locale/currencies")).await
    }

    pub async fn list_languages(&self) -> Result<LanguageList> {
        self.client.call_json(Request::get("/locale/languages")).await
    }
}
