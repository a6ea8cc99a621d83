//! Callback parsing for each ad network.
//!
//! Callbacks arrive as `GET` requests with every field in the query string.
//! Each provider has its own struct with a validating factory; a struct only
//! exists if every required field was present and non-blank.

use http::Uri;
use url::form_urlencoded;

use super::errors::RewardError;
use crate::domain::foundation::{TransactionId, UserId};

/// Decoded query parameters plus the raw query string they came from.
///
/// Parameter order is preserved, and the first occurrence of a name wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    raw: String,
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parses the query component of a request URI.
    pub fn from_uri(uri: &Uri) -> Self {
        Self::parse(uri.query().unwrap_or_default())
    }

    /// Parses a raw (still percent-encoded) query string.
    pub fn parse(raw: &str) -> Self {
        let pairs = form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self {
            raw: raw.to_string(),
            pairs,
        }
    }

    /// The query string exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the decoded value of the first parameter with this name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`get`](Self::get) but treats blank values as absent.
    pub fn non_blank(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }

    /// Returns a required parameter, failing with `InvalidInput` naming it.
    pub fn required(&self, name: &str) -> Result<&str, RewardError> {
        self.non_blank(name)
            .ok_or_else(|| RewardError::missing_parameter(name))
    }
}

/// AdMob server-side verification callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdMobCallback {
    pub transaction_id: TransactionId,
    pub user_id: UserId,
    /// Reward name, carried in `custom_data`.
    pub reward_item: String,
    /// Informational only; grant duration comes from server configuration.
    pub reward_amount: u32,
    pub signature: String,
    pub key_id: String,
    raw_query: String,
}

impl AdMobCallback {
    pub const SIGNATURE_PARAM: &'static str = "signature";
    pub const KEY_ID_PARAM: &'static str = "key_id";

    /// Parses and validates an AdMob callback URI.
    pub fn from_uri(uri: &Uri) -> Result<Self, RewardError> {
        Self::from_params(&QueryParams::from_uri(uri))
    }

    pub fn from_params(params: &QueryParams) -> Result<Self, RewardError> {
        let transaction_id = TransactionId::new(params.required("transaction_id")?)?;
        let user_id = UserId::new(params.required("user_id")?)?;
        let reward_item = params.required("custom_data")?.to_string();
        let signature = params.required(Self::SIGNATURE_PARAM)?.to_string();
        let key_id = params.required(Self::KEY_ID_PARAM)?.to_string();

        let reward_amount = params
            .non_blank("reward_amount")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(1);

        Ok(Self {
            transaction_id,
            user_id,
            reward_item,
            reward_amount,
            signature,
            key_id,
            raw_query: params.raw().to_string(),
        })
    }

    /// The exact bytes AdMob signed.
    ///
    /// This is the received query string with the `signature` and `key_id`
    /// parameters removed. Remaining parameters keep their order and their
    /// original encoding; re-encoding would invalidate the signature.
    pub fn content_to_verify(&self) -> String {
        self.raw_query
            .split('&')
            .filter(|segment| {
                let name = segment.split_once('=').map_or(*segment, |(k, _)| k);
                name != Self::SIGNATURE_PARAM && name != Self::KEY_ID_PARAM
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// AppLovin MAX server-side callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLovinCallback {
    pub event_id: TransactionId,
    pub user_id: UserId,
    /// `ts` exactly as sent; it is part of the signed string.
    pub timestamp: String,
    pub signature: String,
    /// From `reward_type`, falling back to `custom_data`.
    pub reward_name: String,
}

impl AppLovinCallback {
    /// Parses and validates an AppLovin callback URI.
    pub fn from_uri(uri: &Uri) -> Result<Self, RewardError> {
        Self::from_params(&QueryParams::from_uri(uri))
    }

    pub fn from_params(params: &QueryParams) -> Result<Self, RewardError> {
        let event_id = TransactionId::new(params.required("event_id")?)?;
        let user_id = UserId::new(params.required("user_id")?)?;
        let timestamp = params.required("ts")?.to_string();
        let signature = params.required("signature")?.to_string();

        let reward_name = params
            .non_blank("reward_type")
            .or_else(|| params.non_blank("custom_data"))
            .ok_or_else(|| RewardError::missing_parameter("reward_type"))?
            .to_string();

        Ok(Self {
            event_id,
            user_id,
            timestamp,
            signature,
            reward_name,
        })
    }
}

/// IronSource server-to-server rewarded callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IronSourceCallback {
    pub app_user_id: UserId,
    /// `"<amount> <rewardTypeName>"`, parsed after the signature checks out.
    pub rewards: String,
    pub event_id: TransactionId,
    pub timestamp: String,
    pub signature: String,
}

impl IronSourceCallback {
    /// Parses and validates an IronSource callback URI.
    pub fn from_uri(uri: &Uri) -> Result<Self, RewardError> {
        Self::from_params(&QueryParams::from_uri(uri))
    }

    pub fn from_params(params: &QueryParams) -> Result<Self, RewardError> {
        let app_user_id = UserId::new(params.required("appUserId")?)?;
        let rewards = params.required("rewards")?.to_string();
        let event_id = TransactionId::new(params.required("eventId")?)?;
        let timestamp = params.required("timestamp")?.to_string();
        let signature = params.required("signature")?.to_string();

        Ok(Self {
            app_user_id,
            rewards,
            event_id,
            timestamp,
            signature,
        })
    }

    /// Splits `rewards` into its amount and reward name.
    pub fn reward_parts(&self) -> Result<(u32, &str), RewardError> {
        let mut parts = self.rewards.split_whitespace();
        let (amount, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(amount), Some(name), None) => (amount, name),
            _ => {
                return Err(RewardError::invalid_input(format!(
                    "Malformed rewards value: {}",
                    self.rewards
                )))
            }
        };
        let amount = amount.parse::<u32>().map_err(|_| {
            RewardError::invalid_input(format!("Malformed reward amount: {}", amount))
        })?;
        Ok((amount, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(query: &str) -> Uri {
        format!("/api/rewards/callbacks/test?{}", query).parse().unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // QueryParams
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn query_params_decode_values() {
        let params = QueryParams::parse("user_id=a%40b.com&note=hello+world");
        assert_eq!(params.get("user_id"), Some("a@b.com"));
        assert_eq!(params.get("note"), Some("hello world"));
        assert_eq!(params.raw(), "user_id=a%40b.com&note=hello+world");
    }

    #[test]
    fn query_params_first_occurrence_wins() {
        let params = QueryParams::parse("a=1&a=2");
        assert_eq!(params.get("a"), Some("1"));
    }

    #[test]
    fn required_rejects_blank_values() {
        let params = QueryParams::parse("a=&b=%20");
        assert_eq!(
            params.required("a"),
            Err(RewardError::missing_parameter("a"))
        );
        assert_eq!(
            params.required("b"),
            Err(RewardError::missing_parameter("b"))
        );
    }

    #[test]
    fn missing_query_string_parses_empty() {
        let uri: Uri = "/api/rewards/callbacks/admob".parse().unwrap();
        let params = QueryParams::from_uri(&uri);
        assert_eq!(params.raw(), "");
        assert_eq!(params.get("user_id"), None);
    }

    // ══════════════════════════════════════════════════════════════
    // AdMob
    // ══════════════════════════════════════════════════════════════

    const ADMOB_QUERY: &str = "ad_network=5450213213286189855&ad_unit=1234567890\
        &custom_data=adFree&reward_amount=5&reward_item=coins\
        &timestamp=1507770365237823&transaction_id=T1&user_id=user%2B1\
        &signature=MEUCIQCLJS_s4ia_sN06HqzeW7Wc3nhZi4RlW3qV1oO-6-0xAgIgFhJ7&key_id=3335741209";

    #[test]
    fn admob_parses_required_fields() {
        let cb = AdMobCallback::from_uri(&uri(ADMOB_QUERY)).unwrap();

        assert_eq!(cb.transaction_id.as_str(), "T1");
        assert_eq!(cb.user_id.as_str(), "user+1");
        assert_eq!(cb.reward_item, "adFree");
        assert_eq!(cb.reward_amount, 5);
        assert_eq!(cb.key_id, "3335741209");
    }

    #[test]
    fn admob_content_strips_signature_and_key_id_only() {
        let cb = AdMobCallback::from_uri(&uri(ADMOB_QUERY)).unwrap();

        assert_eq!(
            cb.content_to_verify(),
            "ad_network=5450213213286189855&ad_unit=1234567890\
             &custom_data=adFree&reward_amount=5&reward_item=coins\
             &timestamp=1507770365237823&transaction_id=T1&user_id=user%2B1"
        );
    }

    #[test]
    fn admob_content_keeps_order_when_signature_is_not_last() {
        let cb = AdMobCallback::from_uri(&uri(
            "signature=abc&transaction_id=T1&key_id=9&user_id=u%20x&custom_data=adFree",
        ))
        .unwrap();

        assert_eq!(
            cb.content_to_verify(),
            "transaction_id=T1&user_id=u%20x&custom_data=adFree"
        );
    }

    #[test]
    fn admob_reward_amount_defaults_to_one() {
        let missing = AdMobCallback::from_uri(&uri(
            "transaction_id=T&user_id=u&custom_data=adFree&signature=s&key_id=1",
        ))
        .unwrap();
        let garbage = AdMobCallback::from_uri(&uri(
            "transaction_id=T&user_id=u&custom_data=adFree&reward_amount=lots&signature=s&key_id=1",
        ))
        .unwrap();

        assert_eq!(missing.reward_amount, 1);
        assert_eq!(garbage.reward_amount, 1);
    }

    #[test]
    fn admob_names_first_missing_field() {
        let cases = [
            ("user_id=u&custom_data=c&signature=s&key_id=1", "transaction_id"),
            ("transaction_id=T&custom_data=c&signature=s&key_id=1", "user_id"),
            ("transaction_id=T&user_id=u&signature=s&key_id=1", "custom_data"),
            ("transaction_id=T&user_id=u&custom_data=c&key_id=1", "signature"),
            ("transaction_id=T&user_id=u&custom_data=c&signature=s", "key_id"),
            ("transaction_id=T&user_id=&custom_data=c&signature=s&key_id=1", "user_id"),
        ];

        for (query, field) in cases {
            let err = AdMobCallback::from_uri(&uri(query)).unwrap_err();
            assert_eq!(err, RewardError::missing_parameter(field), "query: {}", query);
        }
    }

    // ══════════════════════════════════════════════════════════════
    // AppLovin
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn applovin_prefers_reward_type_over_custom_data() {
        let cb = AppLovinCallback::from_uri(&uri(
            "event_id=E1&user_id=u&ts=1700000000&signature=abc&reward_type=adFree&custom_data=premiumContent",
        ))
        .unwrap();

        assert_eq!(cb.reward_name, "adFree");
        assert_eq!(cb.timestamp, "1700000000");
    }

    #[test]
    fn applovin_falls_back_to_custom_data() {
        let cb = AppLovinCallback::from_uri(&uri(
            "event_id=E1&user_id=u&ts=1&signature=abc&custom_data=premiumContent",
        ))
        .unwrap();

        assert_eq!(cb.reward_name, "premiumContent");
    }

    #[test]
    fn applovin_requires_a_reward_name() {
        let err = AppLovinCallback::from_uri(&uri("event_id=E1&user_id=u&ts=1&signature=abc"))
            .unwrap_err();
        assert_eq!(err, RewardError::missing_parameter("reward_type"));
    }

    #[test]
    fn applovin_requires_ts() {
        let err = AppLovinCallback::from_uri(&uri(
            "event_id=E1&user_id=u&signature=abc&reward_type=adFree",
        ))
        .unwrap_err();
        assert_eq!(err, RewardError::missing_parameter("ts"));
    }

    // ══════════════════════════════════════════════════════════════
    // IronSource
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn ironsource_parses_required_fields() {
        let cb = IronSourceCallback::from_uri(&uri(
            "appUserId=u1&rewards=1%20adFree&eventId=ev1&timestamp=202401011200&signature=ff",
        ))
        .unwrap();

        assert_eq!(cb.app_user_id.as_str(), "u1");
        assert_eq!(cb.rewards, "1 adFree");
        assert_eq!(cb.reward_parts().unwrap(), (1, "adFree"));
    }

    #[test]
    fn ironsource_rejects_malformed_rewards() {
        for rewards in ["adFree", "x adFree", "1 ad Free", "-1 adFree"] {
            let cb = IronSourceCallback {
                app_user_id: UserId::new("u").unwrap(),
                rewards: rewards.to_string(),
                event_id: TransactionId::new("e").unwrap(),
                timestamp: "1".to_string(),
                signature: "s".to_string(),
            };
            assert!(
                matches!(cb.reward_parts(), Err(RewardError::InvalidInput(_))),
                "rewards: {}",
                rewards
            );
        }
    }

    #[test]
    fn ironsource_requires_event_id() {
        let err = IronSourceCallback::from_uri(&uri(
            "appUserId=u1&rewards=1+adFree&timestamp=1&signature=ff",
        ))
        .unwrap_err();
        assert_eq!(err, RewardError::missing_parameter("eventId"));
    }
}
