use kdata_core::kdata::entity::{Fuquan, KdataRecord};
use kdata_core::kdata::error::KdataError;

/// # Summary
/// 对 K 线价格做复权，返回新的记录集合。
///
/// # Logic
/// 1. 逐条将 `open/high/low/close` 乘以该记录自身的 `factor`，得到后复权价。
/// 2. `Hfq` 到此为止。
/// 3. `Qfq` 再整体除以最新因子 `current_factor`，把价格锚定到当前基准。
/// 4. 其余方式没有复权语义，直接报错。
///
/// # Arguments
/// * `records`: 原始记录，不会被修改。
/// * `fuquan`: 复权方式。
/// * `current_factor`: 最新一条记录的复权因子，仅 `Qfq` 使用并校验；`Hfq` 忽略。
///
/// # Returns
/// 成功返回复权后的新记录；参与计算的因子缺失、为零或非有限数时返回 `KdataError::InvalidFactor`。
///
/// # Invariants
/// - 不是幂等操作：对结果再次调用会再乘一次因子。
/// - 缺失的价格字段保持缺失，不引入任何舍入。
pub fn adjust_fuquan_price(
    records: &[KdataRecord],
    fuquan: Fuquan,
    current_factor: Option<f64>,
) -> Result<Vec<KdataRecord>, KdataError> {
    let divisor = match fuquan {
        Fuquan::Hfq => None,
        Fuquan::Qfq => Some(checked_factor(current_factor, || "current factor".to_string())?),
        Fuquan::Bfq => return Err(KdataError::UnsupportedFuquan(fuquan.to_string())),
    };

    records
        .iter()
        .map(|record| {
            let factor = checked_factor(record.factor, || record_label(record))?;
            let mut adjusted = record.clone();
            for price in [
                &mut adjusted.close,
                &mut adjusted.open,
                &mut adjusted.high,
                &mut adjusted.low,
            ] {
                if let Some(value) = price.as_mut() {
                    *value *= factor;
                    if let Some(divisor) = divisor {
                        *value /= divisor;
                    }
                }
            }
            Ok(adjusted)
        })
        .collect()
}

fn checked_factor(factor: Option<f64>, label: impl FnOnce() -> String) -> Result<f64, KdataError> {
    match factor {
        Some(f) if f.is_finite() && f != 0.0 => Ok(f),
        Some(f) => Err(KdataError::InvalidFactor(format!("{} is {}", label(), f))),
        None => Err(KdataError::InvalidFactor(format!("{} is missing", label()))),
    }
}

fn record_label(record: &KdataRecord) -> String {
    format!(
        "factor of record {}@{}",
        record.security_id.as_deref().unwrap_or("?"),
        record.timestamp.as_deref().unwrap_or("?")
    )
}
