//! Collaborator definitions
//!
//! Each remote lookup service is one variant of [`Source`]. A [`Collaborator`]
//! pairs a source with the endpoint template it is queried through; the
//! template carries a `{cep}` placeholder that is replaced by the postal code.

use super::LocationRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder substituted with the postal code in endpoint templates
pub const POSTAL_CODE_PLACEHOLDER: &str = "{cep}";

pub const BRASILAPI_ENDPOINT: &str = "https://brasilapi.com.br/api/cep/v1/{cep}";
pub const VIACEP_ENDPOINT: &str = "http://viacep.com.br/ws/{cep}/json/";

/// Remote lookup service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// BrasilAPI CEP v1 endpoint
    BrasilApi,
    /// ViaCEP legacy endpoint (postal code embedded in the path)
    ViaCep,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::BrasilApi, Source::ViaCep];

    /// Endpoint template used when the configuration does not override it
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Source::BrasilApi => BRASILAPI_ENDPOINT,
            Source::ViaCep => VIACEP_ENDPOINT,
        }
    }

    /// Decode a response body in this source's wire format
    pub fn decode(&self, body: &[u8]) -> Result<LocationRecord, serde_json::Error> {
        match self {
            Source::BrasilApi => serde_json::from_slice::<BrasilApiBody>(body).map(Into::into),
            Source::ViaCep => serde_json::from_slice::<ViaCepBody>(body).map(Into::into),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::BrasilApi => write!(f, "BrasilAPI"),
            Source::ViaCep => write!(f, "ViaCEP"),
        }
    }
}

/// A source together with the endpoint it is reached at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collaborator {
    pub source: Source,
    pub endpoint: String,
}

impl Collaborator {
    pub fn new(source: Source, endpoint: impl Into<String>) -> Self {
        Self {
            source,
            endpoint: endpoint.into(),
        }
    }

    /// Collaborator at its public endpoint
    pub fn public(source: Source) -> Self {
        Self::new(source, source.default_endpoint())
    }

    /// Endpoint URL for a given postal code
    pub fn url_for(&self, postal_code: &str) -> String {
        self.endpoint.replace(POSTAL_CODE_PLACEHOLDER, postal_code)
    }
}

#[derive(Debug, Deserialize)]
struct BrasilApiBody {
    #[serde(default)]
    cep: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    neighborhood: Option<String>,
    #[serde(default)]
    street: Option<String>,
}

impl From<BrasilApiBody> for LocationRecord {
    fn from(body: BrasilApiBody) -> Self {
        LocationRecord {
            postal_code: non_empty(body.cep),
            state: non_empty(body.state),
            city: non_empty(body.city),
            neighborhood: non_empty(body.neighborhood),
            street: non_empty(body.street),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ViaCepBody {
    #[serde(default)]
    cep: Option<String>,
    #[serde(default)]
    logradouro: Option<String>,
    #[serde(default)]
    complemento: Option<String>,
    #[serde(default)]
    bairro: Option<String>,
    #[serde(default)]
    localidade: Option<String>,
    #[serde(default)]
    uf: Option<String>,
}

impl From<ViaCepBody> for LocationRecord {
    fn from(body: ViaCepBody) -> Self {
        // ViaCEP splits the street line; fold the complement back in
        let street = match (non_empty(body.logradouro), non_empty(body.complemento)) {
            (Some(street), Some(complement)) => Some(format!("{}, {}", street, complement)),
            (street, None) => street,
            (None, complement) => complement,
        };

        LocationRecord {
            postal_code: non_empty(body.cep),
            state: non_empty(body.uf),
            city: non_empty(body.localidade),
            neighborhood: non_empty(body.bairro),
            street,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
