// Display formats shared by the sources. Values are rounded to two decimals.

pub fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

pub fn usd_billions(value: f64) -> String {
    format!("${:.2}B", value / 1e9)
}

pub fn price(prefix: &str, value: f64) -> String {
    format!("{}{:.2}", prefix, value)
}
