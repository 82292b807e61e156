use super::error::FilterError;
use super::types::{ListParams, PageSpec, ProductFilter};

/// Validated listing request: what to match and which page to return
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub products: ProductFilter,
    pub page: PageSpec,
}

impl Filter {
    pub fn from_params(params: &ListParams, default_limit: u64) -> Result<Self, FilterError> {
        let page = parse_count("page", params.page.as_deref())?.unwrap_or(1);
        let limit = parse_count("limit", params.limit.as_deref())?.unwrap_or(default_limit);

        let min_price = parse_price("minPrice", params.min_price.as_deref())?;
        let max_price = parse_price("maxPrice", params.max_price.as_deref())?;
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(FilterError::PriceRange);
            }
        }

        let name_contains = params
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Ok(Self {
            products: ProductFilter {
                name_contains,
                min_price,
                max_price,
            },
            page: PageSpec::new(page, limit),
        })
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Reads the leading integer of `raw` and ignores whatever follows it, so
/// `2.5` is page 2. Values below one are clamped to one. Only input with no
/// leading digits is rejected.
fn parse_count(param: &'static str, raw: Option<&str>) -> Result<Option<u64>, FilterError> {
    let Some(raw) = non_blank(raw) else {
        return Ok(None);
    };

    let (negative, unsigned) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let digits_len = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(FilterError::InvalidInteger {
            param,
            value: raw.to_string(),
        });
    }
    if negative {
        return Ok(Some(1));
    }

    // Digit-only input can only fail to parse by overflowing
    let value = unsigned[..digits_len].parse::<u64>().unwrap_or(u64::MAX);
    Ok(Some(value.max(1)))
}

fn parse_price(param: &'static str, raw: Option<&str>) -> Result<Option<f64>, FilterError> {
    let Some(raw) = non_blank(raw) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(FilterError::InvalidNumber {
            param,
            value: raw.to_string(),
        }),
    }
}
