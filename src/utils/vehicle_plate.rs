/// 车牌规范化: 大写, 合并连续空白
pub fn normalize_plate(plate: &str) -> String {
    plate
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// 规范化并去重, 保持首次出现的顺序, 丢弃空值
pub fn normalize_plates<I, S>(plates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut merged: Vec<String> = Vec::new();
    for plate in plates {
        let plate = normalize_plate(plate.as_ref());
        if !plate.is_empty() && !merged.contains(&plate) {
            merged.push(plate);
        }
    }
    merged
}

/// 把本次预约的车牌并入客户已有的车牌列表
pub fn merge_vehicle_plates(existing: &[String], plate: &str) -> Vec<String> {
    normalize_plates(existing.iter().map(String::as_str).chain(std::iter::once(plate)))
}
