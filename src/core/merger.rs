use crate::domain::model::{
    MergedResponse, UpstreamPayload, UpstreamResult, DASHA, KUNDLI, PLANET_POSITION,
};
use crate::utils::error::{ProxyError, Result};
use serde_json::{Map, Value};

/// 合併各端點結果；任何一個失敗就整體失敗（依宣告順序取第一個）
pub fn merge(results: &[UpstreamResult]) -> Result<MergedResponse> {
    if let Some(failed) = results.iter().find(|r| !r.ok) {
        return Err(ProxyError::UpstreamError {
            endpoint: failed.endpoint_name.clone(),
            message: failed
                .error_message
                .clone()
                .unwrap_or_else(|| describe_status(failed.status_code)),
        });
    }

    let mut kundli_data = required_json(results, KUNDLI)?;
    let dasha_data = required_json(results, DASHA)?;

    if let Some(planets) = find(results, PLANET_POSITION) {
        let planet_data = json_payload(planets)?
            .get("data")
            .cloned()
            .unwrap_or(Value::Null);
        graft_planet_positions(&mut kundli_data, &planet_data)?;
    }

    Ok(MergedResponse {
        kundli_data,
        dasha_data,
    })
}

// kundliData.data.ascendant / kundliData.data.planet_positions
// kundli 不是物件時回報錯誤，不覆寫上游資料
fn graft_planet_positions(kundli_data: &mut Value, planet_data: &Value) -> Result<()> {
    let root = kundli_data
        .as_object_mut()
        .ok_or_else(|| non_object_kundli("payload"))?;
    let data = root
        .entry("data")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| non_object_kundli("data field"))?;

    if let Some(ascendant) = planet_data.get("ascendant") {
        data.insert("ascendant".to_string(), ascendant.clone());
    }
    if let Some(planets) = planet_data.get("planets") {
        data.insert("planet_positions".to_string(), planets.clone());
    }
    Ok(())
}

fn non_object_kundli(part: &str) -> ProxyError {
    ProxyError::UpstreamError {
        endpoint: KUNDLI.to_string(),
        message: format!(
            "{} {} is not a JSON object, planet positions cannot be merged",
            KUNDLI, part
        ),
    }
}

fn find<'a>(results: &'a [UpstreamResult], name: &str) -> Option<&'a UpstreamResult> {
    results.iter().find(|r| r.endpoint_name == name)
}

fn required_json(results: &[UpstreamResult], name: &str) -> Result<Value> {
    let result = find(results, name).ok_or_else(|| ProxyError::UpstreamError {
        endpoint: name.to_string(),
        message: format!("no result was returned for {}", name),
    })?;
    json_payload(result).cloned()
}

fn json_payload(result: &UpstreamResult) -> Result<&Value> {
    match &result.payload {
        UpstreamPayload::Json(value) => Ok(value),
        UpstreamPayload::Text(_) | UpstreamPayload::Empty => Err(ProxyError::UpstreamError {
            endpoint: result.endpoint_name.clone(),
            message: format!("{} returned a non-JSON payload", result.endpoint_name),
        }),
    }
}

fn describe_status(status_code: Option<u16>) -> String {
    match status_code {
        Some(code) => format!("request failed with status {}", code),
        None => "request failed without a response".to_string(),
    }
}
