// Static catalogs: the instructor-facing parameters and the analytics this
// provider reports. Both are built once and served verbatim.

use lazy_static::lazy_static;
use serde::Serialize;
use serde_json::json;

use crate::value::{MetricValue, ParamValue};

// ── Parameters ───────────────────────────────────────────────────────

/// Wire type of an activity parameter, using the Inven!RA type tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParamType {
    #[serde(rename = "text/plain")]
    Text,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "string")]
    String,
}

/// One instructor-configurable field of the activity.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl ParameterDefinition {
    fn new(name: &str, kind: ParamType, label: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            label: Some(label.to_string()),
            default: None,
            required: false,
            min: None,
            max: None,
            options: None,
        }
    }

    fn default_value(mut self, value: impl Into<ParamValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn bounds(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

fn build_parameters() -> Vec<ParameterDefinition> {
    vec![
        ParameterDefinition::new("nome", ParamType::Text, "Nome da atividade")
            .default_value("Sopa de Letras – Vocabulário")
            .required(),
        ParameterDefinition::new("orientacoes", ParamType::Text, "Orientações para o aluno")
            .default_value(
                "Encontre todas as palavras relacionadas ao tema proposto, no idioma alvo, \
                 dentro do tempo limite.",
            ),
        ParameterDefinition::new(
            "tempoLimiteSegundos",
            ParamType::Integer,
            "Tempo limite por tentativa (segundos)",
        )
        .default_value(300_i64)
        .bounds(30, 3600),
        ParameterDefinition::new(
            "tamanhoQuadro",
            ParamType::Integer,
            "Tamanho do quadro (linhas/colunas)",
        )
        .default_value(12_i64)
        .bounds(6, 20),
        ParameterDefinition::new(
            "sensivelMaiusculas",
            ParamType::Boolean,
            "Diferenciar maiúsculas e minúsculas",
        )
        .default_value(false),
        ParameterDefinition::new(
            "permitirDiagonais",
            ParamType::Boolean,
            "Permitir palavras na diagonal",
        )
        .default_value(true),
        ParameterDefinition::new(
            "parametrosPalavras",
            ParamType::Json,
            "Parâmetros de palavras (JSON)",
        )
        .default_value(json!({
            "idioma_nativo": ["cachorro", "gato", "casa"],
            "idioma_alvo": ["dog", "cat", "house"],
        }))
        .required(),
    ]
}

// ── Analytics ────────────────────────────────────────────────────────

/// Wire type of an analytics metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricType {
    #[serde(rename = "text/plain")]
    Text,
    #[serde(rename = "array/string")]
    TextList,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "number")]
    Number,
}

impl MetricType {
    /// Whether a reported value has the shape this metric declares.
    /// Integers are accepted where a number is expected.
    pub fn accepts(&self, value: &MetricValue) -> bool {
        matches!(
            (self, value),
            (MetricType::Text, MetricValue::Text(_))
                | (MetricType::TextList, MetricValue::TextList(_))
                | (MetricType::Integer, MetricValue::Int(_))
                | (MetricType::Number, MetricValue::Number(_) | MetricValue::Int(_))
        )
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricType::Text => write!(f, "text/plain"),
            MetricType::TextList => write!(f, "array/string"),
            MetricType::Integer => write!(f, "integer"),
            MetricType::Number => write!(f, "number"),
        }
    }
}

/// Whether a metric is reported in the qualitative or quantitative list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Qualitative,
    Quantitative,
}

/// A metric this provider claims to report. `name` doubles as its id.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsMetricDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MetricType,
    pub description: String,
}

impl AnalyticsMetricDef {
    fn new(name: &str, kind: MetricType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
        }
    }
}

/// The full analytics taxonomy, split the way Inven!RA expects it.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsCatalog {
    #[serde(rename = "qualAnalytics")]
    pub qualitative: Vec<AnalyticsMetricDef>,
    #[serde(rename = "quantAnalytics")]
    pub quantitative: Vec<AnalyticsMetricDef>,
}

impl AnalyticsCatalog {
    /// Find a metric by name, along with the list it belongs to.
    pub fn lookup(&self, name: &str) -> Option<(MetricKind, &AnalyticsMetricDef)> {
        self.qualitative
            .iter()
            .find(|m| m.name == name)
            .map(|m| (MetricKind::Qualitative, m))
            .or_else(|| {
                self.quantitative
                    .iter()
                    .find(|m| m.name == name)
                    .map(|m| (MetricKind::Quantitative, m))
            })
    }

    /// All metric names, qualitative first, in declared order.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.qualitative
            .iter()
            .chain(self.quantitative.iter())
            .map(|m| m.name.as_str())
    }
}

fn build_analytics() -> AnalyticsCatalog {
    AnalyticsCatalog {
        qualitative: vec![
            AnalyticsMetricDef::new(
                "ultima_palavra_encontrada",
                MetricType::Text,
                "Última palavra encontrada pelo aluno",
            ),
            AnalyticsMetricDef::new(
                "sequencia_cliques",
                MetricType::TextList,
                "Sequência de letras clicadas, no formato letra(linha,coluna)",
            ),
        ],
        quantitative: vec![
            AnalyticsMetricDef::new(
                "tentativas_total",
                MetricType::Integer,
                "Número total de tentativas",
            ),
            AnalyticsMetricDef::new(
                "tentativas_corretas",
                MetricType::Integer,
                "Número de tentativas corretas",
            ),
            AnalyticsMetricDef::new(
                "tentativas_erradas",
                MetricType::Integer,
                "Número de tentativas erradas",
            ),
            AnalyticsMetricDef::new(
                "tempo_medio_por_acerto_s",
                MetricType::Number,
                "Tempo médio por acerto, em segundos",
            ),
            AnalyticsMetricDef::new(
                "percentual_acertos",
                MetricType::Number,
                "Percentagem de tentativas corretas",
            ),
            AnalyticsMetricDef::new(
                "percentual_erros",
                MetricType::Number,
                "Percentagem de tentativas erradas",
            ),
        ],
    }
}

lazy_static! {
    static ref PARAMETERS: Vec<ParameterDefinition> = build_parameters();
    static ref ANALYTICS: AnalyticsCatalog = build_analytics();
}

/// The ordered parameter catalog served at `/params`.
pub fn parameters() -> &'static [ParameterDefinition] {
    &PARAMETERS
}

/// The analytics catalog served at `/analytics/available`.
pub fn analytics() -> &'static AnalyticsCatalog {
    &ANALYTICS
}
