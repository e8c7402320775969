/// Subgraph GraphQL response types
///
/// BigInt and BigDecimal fields arrive as JSON strings; they are accepted as
/// either strings or numbers.
use crate::errors::{AprError, AprResult};
use crate::pools::types::{tick_spacing_for_fee_tier, HistoricalFeeSample, PoolState, TokenInfo};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// `{ "data": ..., "errors": [...] }`
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

impl<T> GraphQlResponse<T> {
    /// Errors array wins over partial data
    pub fn into_result(self, endpoint: &str) -> AprResult<T> {
        if !self.errors.is_empty() {
            let messages: Vec<String> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(AprError::transport(endpoint, messages.join("; ")));
        }
        self.data
            .ok_or_else(|| AprError::parse("graphql response", "missing data field"))
    }
}

#[derive(Debug, Deserialize)]
pub struct PoolQueryData {
    pub pool: Option<SubgraphPool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphToken {
    pub id: String,
    pub symbol: String,
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub decimals: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphPool {
    pub id: String,
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub fee_tier: f64,
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub liquidity: f64,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_number")]
    pub tick: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_number")]
    pub sqrt_price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_number", rename = "feesUSD")]
    pub fees_usd: Option<f64>,
    pub token0: SubgraphToken,
    pub token1: SubgraphToken,
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub token0_price: f64,
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub token1_price: f64,
    #[serde(deserialize_with = "deserialize_string_or_number", rename = "totalValueLockedUSD")]
    pub total_value_locked_usd: f64,
}

impl SubgraphPool {
    /// Current price is `token1Price` (token1 per token0, e.g. USDC per WETH)
    pub fn into_pool_state(self, default_tick_spacing: i32) -> AprResult<PoolState> {
        let tick = self.tick.ok_or_else(|| {
            AprError::data_unavailable(format!("pool {}", self.id), "pool has no current tick")
        })?;
        if !tick.is_finite() || tick.fract() != 0.0 || tick.abs() > i32::MAX as f64 {
            return Err(AprError::parse("pool.tick", format!("not an integer tick: {}", tick)));
        }
        if self.fee_tier < 0.0 || self.fee_tier > u32::MAX as f64 {
            return Err(AprError::parse("pool.feeTier", format!("out of range: {}", self.fee_tier)));
        }

        let fee_tier = self.fee_tier as u32;
        Ok(PoolState {
            id: self.id,
            token0: self.token0.into_token_info()?,
            token1: self.token1.into_token_info()?,
            current_tick: tick as i32,
            current_price: self.token1_price,
            fee_tier,
            tick_spacing: tick_spacing_for_fee_tier(fee_tier, default_tick_spacing),
            liquidity: self.liquidity,
            total_value_locked_usd: self.total_value_locked_usd,
            recent_fees_usd: self.fees_usd.unwrap_or(0.0),
        })
    }
}

impl SubgraphToken {
    fn into_token_info(self) -> AprResult<TokenInfo> {
        if !(0.0..=u8::MAX as f64).contains(&self.decimals) {
            return Err(AprError::parse(
                "token.decimals",
                format!("{} has invalid decimals {}", self.symbol, self.decimals),
            ));
        }
        Ok(TokenInfo {
            address: self.id,
            symbol: self.symbol,
            decimals: self.decimals as u8,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDayDatasData {
    pub pool_day_datas: Vec<SubgraphPoolDayData>,
}

#[derive(Debug, Deserialize)]
pub struct SubgraphPoolDayData {
    /// Unix seconds at the start of the day
    pub date: i64,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_number", rename = "feesUSD")]
    pub fees_usd: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_number", rename = "volumeUSD")]
    pub volume_usd: Option<f64>,
}

impl SubgraphPoolDayData {
    pub fn into_sample(self) -> AprResult<HistoricalFeeSample> {
        let date = Utc
            .timestamp_opt(self.date, 0)
            .single()
            .ok_or_else(|| AprError::parse("poolDayData.date", format!("bad timestamp {}", self.date)))?;
        Ok(HistoricalFeeSample {
            date,
            fees_usd: self.fees_usd.unwrap_or(0.0),
            volume_usd: self.volume_usd.unwrap_or(0.0),
        })
    }
}

/// Accepts `"123.45"`, `123.45` or `123`
pub fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct StringOrNumber;

    impl<'de> Visitor<'de> for StringOrNumber {
        type Value = f64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a numeric string")
        }

        fn visit_str<E>(self, value: &str) -> Result<f64, E>
        where
            E: de::Error,
        {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid numeric string: {:?}", value)))
        }

        fn visit_i64<E>(self, value: i64) -> Result<f64, E>
        where
            E: de::Error,
        {
            Ok(value as f64)
        }

        fn visit_u64<E>(self, value: u64) -> Result<f64, E>
        where
            E: de::Error,
        {
            Ok(value as f64)
        }

        fn visit_f64<E>(self, value: f64) -> Result<f64, E>
        where
            E: de::Error,
        {
            Ok(value)
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

pub fn deserialize_optional_string_or_number<'de, D>(
    deserializer: D,
) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct OptionalStringOrNumber;

    impl<'de> Visitor<'de> for OptionalStringOrNumber {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("null, a number or a numeric string")
        }

        fn visit_none<E>(self) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Option<f64>, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserialize_string_or_number(deserializer).map(Some)
        }
    }

    deserializer.deserialize_option(OptionalStringOrNumber)
}
