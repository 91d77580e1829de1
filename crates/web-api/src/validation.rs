//! 请求体校验
//!
//! `validator` 的派生校验在 API 边界先拦一道，失败聚合为字段错误列表。
//! 领域层的值对象会再做一次最终校验。

use application::FieldError;
use validator::Validate;

use crate::error::ApiError;

pub(crate) fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload.validate().map_err(|errors| {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                let field = field.to_string();
                errors.iter().take(1).map(move |err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    FieldError::new(field.clone(), message)
                })
            })
            .collect();
        // HashMap 的遍历顺序不稳定，排序让响应可预测
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::BadRequest(fields)
    })
}
