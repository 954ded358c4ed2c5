//! Product card markup in three display modes, plus multi-card grids.

use crate::render::html::{escape, safe_href, truncate, Document};
use crate::resources::{AgeGroup, Availability, DisplayMode, ItemCondition, ProductCard};

const CARD_DESCRIPTION_LIMIT: usize = 100;
const LIST_DESCRIPTION_LIMIT: usize = 200;

/// Standalone document for one product.
pub fn render(product: &ProductCard, mode: DisplayMode) -> String {
    let body = format!("<div class=\"product-container\">\n{}\n</div>", card_markup(product, mode));
    Document::new(&product.title, STYLES, body)
        .with_script(BEHAVIOR.to_string())
        .render()
}

/// Standalone document laying out several products, each in its own display mode.
pub fn render_grid(products: &[&ProductCard]) -> String {
    let cards = products
        .iter()
        .map(|p| card_markup(p, p.display_mode))
        .collect::<Vec<_>>()
        .join("\n");
    let body = format!("<div class=\"product-grid\">\n{}\n</div>", cards);
    Document::new("Products", STYLES, body)
        .with_script(BEHAVIOR.to_string())
        .render()
}

pub fn card_markup(product: &ProductCard, mode: DisplayMode) -> String {
    match mode {
        DisplayMode::Card => full_card(product),
        DisplayMode::List => list_card(product),
        DisplayMode::Compact => compact_card(product),
    }
}

fn full_card(p: &ProductCard) -> String {
    let discount = p
        .discount_percent()
        .map(|pct| format!("<div class=\"discount-badge\">{}% OFF</div>", pct))
        .unwrap_or_default();

    let mut info = String::new();
    if let Some(brand) = &p.brand {
        info.push_str(&format!("<div class=\"product-brand\">{}</div>", escape(brand)));
    }
    info.push_str(&format!("<h3 class=\"product-title\">{}</h3>", escape(&p.title)));
    info.push_str(&rating(p.product_review_rating, p.product_review_count));
    info.push_str(&format!(
        "<p class=\"product-description\">{}</p>",
        escape(&truncate(&p.description, CARD_DESCRIPTION_LIMIT))
    ));
    info.push_str(&pricing(p, "product-pricing"));
    if let Some(trend) = &p.pricing_trend {
        info.push_str(&format!("<div class=\"pricing-trend\">{}</div>", escape(trend)));
    }
    info.push_str(&variants(p));
    if let Some(warning) = &p.warning {
        info.push_str(&format!("<div class=\"product-warning\">&#9888; {}</div>", escape(warning)));
    }
    info.push_str(&tabs(p));
    info.push_str(&actions(p));

    format!(
        "<div class=\"product-card\" data-product-id=\"{id}\">\
<div class=\"product-image-container\">{image}{badge}{discount}</div>\
<div class=\"product-info\">{info}</div></div>",
        id = escape(&p.id),
        image = image(p, "product-image"),
        badge = availability_badge(p.availability, p.inventory_quantity),
        discount = discount,
        info = info,
    )
}

fn list_card(p: &ProductCard) -> String {
    let sale = if p.effective_sale_price().is_some() {
        "<div class=\"discount-badge\">Sale</div>"
    } else {
        ""
    };

    format!(
        "<div class=\"product-card-list\" data-product-id=\"{id}\">\
<div class=\"product-image-container-list\">{image}{sale}</div>\
<div class=\"product-info-list\">{brand}<h3 class=\"product-title\">{title}</h3>{rating}\
<p class=\"product-description-list\">{description}</p>{variants}</div>\
<div class=\"product-actions-list\">{badge}{pricing}{actions}</div></div>",
        id = escape(&p.id),
        image = image(p, "product-image-list"),
        sale = sale,
        brand = p
            .brand
            .as_deref()
            .map(|b| format!("<div class=\"product-brand\">{}</div>", escape(b)))
            .unwrap_or_default(),
        title = escape(&p.title),
        rating = rating(p.product_review_rating, p.product_review_count),
        description = escape(&truncate(&p.description, LIST_DESCRIPTION_LIMIT)),
        variants = variants(p),
        badge = availability_badge(p.availability, p.inventory_quantity),
        pricing = pricing(p, "product-pricing"),
        actions = actions(p),
    )
}

fn compact_card(p: &ProductCard) -> String {
    format!(
        "<div class=\"product-card-compact\" data-product-id=\"{id}\">{image}\
<div class=\"product-info-compact\"><div class=\"product-title-compact\">{title}</div>{pricing}</div></div>",
        id = escape(&p.id),
        image = image(p, "product-image-compact"),
        title = escape(&p.title),
        pricing = pricing(p, "product-pricing-compact"),
    )
}

fn image(p: &ProductCard, class: &str) -> String {
    format!(
        "<img src=\"{}\" alt=\"{}\" class=\"{}\" loading=\"lazy\">",
        safe_href(&p.image_link),
        escape(&p.title),
        class
    )
}

fn pricing(p: &ProductCard, class: &str) -> String {
    match p.effective_sale_price() {
        Some(sale) => format!(
            "<div class=\"{}\"><span class=\"product-price-sale\">{}</span>\
<span class=\"product-price product-price-original\">{}</span></div>",
            class,
            escape(&sale.display()),
            escape(&p.price.display())
        ),
        None => format!(
            "<div class=\"{}\"><span class=\"product-price\">{}</span></div>",
            class,
            escape(&p.price.display())
        ),
    }
}

pub fn availability_badge(availability: Availability, inventory: Option<u64>) -> String {
    let (class, text) = match availability {
        Availability::InStock => (
            "in-stock",
            match inventory {
                Some(n) if n > 0 => format!("{} in stock", n),
                _ => "In Stock".to_string(),
            },
        ),
        Availability::OutOfStock => ("out-of-stock", "Out of Stock".to_string()),
        Availability::Preorder => ("preorder", "Pre-order".to_string()),
    };
    format!("<div class=\"availability-badge {}\">{}</div>", class, text)
}

/// Five-slot star row: full stars, one half star at >= .5, the rest empty.
pub fn stars(value: f64) -> String {
    let value = value.clamp(0.0, 5.0);
    let full = value.floor() as usize;
    let half = value.fract() >= 0.5;
    let empty = 5 - full - usize::from(half);

    let mut out = "★".repeat(full);
    if half {
        out.push('⯨');
    }
    out.push_str(&"☆".repeat(empty));
    out
}

fn rating(value: Option<f64>, count: Option<u64>) -> String {
    let Some(value) = value.filter(|v| *v > 0.0) else {
        return String::new();
    };
    let reviews = match count {
        Some(n) if n > 0 => format!(" ({} reviews)", group_thousands(n)),
        _ => String::new(),
    };
    format!(
        "<div class=\"product-rating\"><span class=\"rating-stars\" title=\"{:.1} out of 5\">{}</span>\
<span class=\"rating-count\">{}</span></div>",
        value,
        stars(value),
        reviews
    )
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn variants(p: &ProductCard) -> String {
    let mut parts = vec![];
    if let Some(color) = &p.color {
        parts.push(format!("Color: {}", escape(color)));
    }
    if let Some(size) = &p.size {
        parts.push(format!("Size: {}", escape(size)));
    }
    for (category, option) in [
        (&p.custom_variant1_category, &p.custom_variant1_option),
        (&p.custom_variant2_category, &p.custom_variant2_option),
        (&p.custom_variant3_category, &p.custom_variant3_option),
    ] {
        if let (Some(category), Some(option)) = (category, option) {
            parts.push(format!("{}: {}", escape(category), escape(option)));
        }
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!("<div class=\"product-variants\">{}</div>", parts.join(" • "))
    }
}

fn condition_label(condition: ItemCondition) -> &'static str {
    match condition {
        ItemCondition::New => "New",
        ItemCondition::Refurbished => "Refurbished",
        ItemCondition::Used => "Used",
    }
}

fn age_group_label(group: AgeGroup) -> &'static str {
    match group {
        AgeGroup::Newborn => "Newborn",
        AgeGroup::Infant => "Infant",
        AgeGroup::Toddler => "Toddler",
        AgeGroup::Kids => "Kids",
        AgeGroup::Adult => "Adult",
    }
}

fn tabs(p: &ProductCard) -> String {
    let mut features: Vec<(&str, String)> = vec![];
    if let Some(condition) = p.condition {
        features.push(("Condition", condition_label(condition).to_string()));
    }
    if let Some(material) = &p.material {
        features.push(("Material", material.clone()));
    }
    if let Some(shipping) = &p.shipping {
        features.push(("Shipping", shipping.clone()));
    }
    if let Some(estimate) = &p.delivery_estimate {
        features.push(("Delivery", estimate.clone()));
    }
    if let Some(days) = p.return_window {
        features.push(("Returns", format!("{} day return window", days)));
    }

    let mut specs: Vec<(&str, String)> = vec![];
    if let Some(brand) = &p.brand {
        specs.push(("Brand", brand.clone()));
    }
    if let Some(gtin) = &p.gtin {
        specs.push(("GTIN", gtin.clone()));
    }
    if let Some(mpn) = &p.mpn {
        specs.push(("MPN", mpn.clone()));
    }
    if let Some(dimensions) = &p.dimensions {
        specs.push(("Dimensions", dimensions.clone()));
    }
    if let Some(weight) = &p.weight {
        specs.push(("Weight", weight.clone()));
    }
    if let Some(group) = p.age_group {
        specs.push(("Age Group", age_group_label(group).to_string()));
    }

    if features.is_empty() && specs.is_empty() {
        return String::new();
    }

    let mut buttons = String::new();
    let mut panels = String::new();
    for (name, label, rows) in [("features", "Features", &features), ("specs", "Specs", &specs)] {
        if rows.is_empty() {
            continue;
        }
        let active = buttons.is_empty();
        buttons.push_str(&format!(
            "<button type=\"button\" class=\"tab-button{}\" data-tab=\"{}\">{}</button>",
            if active { " active" } else { "" },
            name,
            label
        ));
        panels.push_str(&tab_panel(name, rows, active));
    }

    format!("<div class=\"product-tabs\"><div class=\"tab-buttons\">{}</div>{}</div>", buttons, panels)
}

fn tab_panel(name: &str, rows: &[(&str, String)], active: bool) -> String {
    let items = rows
        .iter()
        .map(|(label, value)| format!("<li><strong>{}:</strong> {}</li>", label, escape(value)))
        .collect::<String>();
    format!(
        "<div class=\"tab-panel{}\" data-panel=\"{}\"><ul>{}</ul></div>",
        if active { " active" } else { "" },
        name,
        items
    )
}

fn actions(p: &ProductCard) -> String {
    let cart = if p.availability == Availability::OutOfStock {
        "<button type=\"button\" class=\"add-to-cart-btn\" disabled>Out of Stock</button>".to_string()
    } else {
        format!(
            "<button type=\"button\" class=\"add-to-cart-btn\" data-product-id=\"{}\">Add to Cart</button>",
            escape(&p.id)
        )
    };
    format!(
        "<div class=\"product-actions\"><a class=\"product-link\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">View Product</a>{}</div>",
        safe_href(&p.link),
        cart
    )
}

const BEHAVIOR: &str = r#"(function () {
  document.querySelectorAll('.product-tabs').forEach(function (tabs) {
    tabs.querySelectorAll('.tab-button').forEach(function (button) {
      button.addEventListener('click', function () {
        var target = button.getAttribute('data-tab');
        tabs.querySelectorAll('.tab-button').forEach(function (b) { b.classList.toggle('active', b === button); });
        tabs.querySelectorAll('.tab-panel').forEach(function (p) {
          p.classList.toggle('active', p.getAttribute('data-panel') === target);
        });
      });
    });
  });
  document.querySelectorAll('.add-to-cart-btn[data-product-id]').forEach(function (button) {
    button.addEventListener('click', function () {
      var productId = button.getAttribute('data-product-id');
      window.parent.postMessage({ type: 'tool', payload: { toolName: 'add_to_cart', params: { productId: productId } } }, '*');
      button.textContent = 'Added';
    });
  });
})();"#;

const STYLES: &str = r#"    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }
    .product-container { max-width: 400px; margin: 0 auto; }
    .product-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 20px; max-width: 1200px; margin: 0 auto; }
    .product-card { background: white; border-radius: 12px; overflow: hidden; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
    .product-image-container { position: relative; width: 100%; padding-top: 100%; background: #f9f9f9; overflow: hidden; }
    .product-image { position: absolute; top: 0; left: 0; width: 100%; height: 100%; object-fit: cover; }
    .product-info { padding: 16px; }
    .product-brand { font-size: 12px; color: #666; text-transform: uppercase; letter-spacing: 0.5px; margin-bottom: 4px; }
    .product-title { font-size: 16px; font-weight: 600; margin: 0 0 8px 0; color: #333; }
    .product-description, .product-description-list { font-size: 14px; color: #666; line-height: 1.5; margin: 0 0 12px 0; }
    .product-rating { display: flex; align-items: center; gap: 6px; margin-bottom: 8px; }
    .rating-stars { color: #ffa500; font-size: 14px; }
    .rating-count { font-size: 12px; color: #666; }
    .product-pricing, .product-pricing-compact { display: flex; align-items: baseline; gap: 8px; margin-bottom: 8px; }
    .product-price { font-size: 20px; font-weight: 700; color: #333; }
    .product-price-sale { font-size: 20px; font-weight: 700; color: #e74c3c; }
    .product-price-original { font-size: 14px; font-weight: 400; color: #999; text-decoration: line-through; }
    .pricing-trend { font-size: 12px; color: #27ae60; margin-bottom: 8px; }
    .product-variants { font-size: 13px; color: #666; margin-bottom: 12px; }
    .product-warning { font-size: 12px; color: #b45309; background: #fef3c7; padding: 6px 8px; border-radius: 4px; margin-bottom: 12px; }
    .availability-badge { position: absolute; top: 12px; left: 12px; padding: 4px 10px; border-radius: 12px; font-size: 12px; font-weight: 600; }
    .availability-badge.in-stock { background: #d4edda; color: #155724; }
    .availability-badge.out-of-stock { background: #f8d7da; color: #721c24; }
    .availability-badge.preorder { background: #fff3cd; color: #856404; }
    .discount-badge { position: absolute; top: 12px; right: 12px; background: #e74c3c; color: white; padding: 4px 10px; border-radius: 12px; font-size: 12px; font-weight: 700; }
    .product-tabs { border-top: 1px solid #eee; margin: 12px 0; padding-top: 8px; }
    .tab-buttons { display: flex; gap: 8px; margin-bottom: 8px; }
    .tab-button { background: none; border: none; padding: 6px 10px; font-size: 13px; color: #666; cursor: pointer; border-bottom: 2px solid transparent; }
    .tab-button.active { color: #007bff; border-bottom-color: #007bff; }
    .tab-panel { display: none; font-size: 13px; color: #444; }
    .tab-panel.active { display: block; }
    .tab-panel ul { margin: 0; padding-left: 18px; }
    .product-actions { display: flex; gap: 8px; }
    .product-link { flex: 1; text-align: center; padding: 10px; border: 1px solid #007bff; color: #007bff; border-radius: 8px; text-decoration: none; font-size: 14px; }
    .add-to-cart-btn { flex: 1; padding: 10px; background: #007bff; color: white; border: none; border-radius: 8px; font-size: 14px; font-weight: 600; cursor: pointer; }
    .add-to-cart-btn:disabled { background: #ccc; cursor: not-allowed; }
    .product-card-list { display: flex; gap: 16px; background: white; border-radius: 12px; padding: 16px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
    .product-image-container-list { position: relative; flex: 0 0 160px; height: 160px; }
    .product-image-list { width: 100%; height: 100%; object-fit: cover; border-radius: 8px; }
    .product-info-list { flex: 1; }
    .product-actions-list { display: flex; flex-direction: column; align-items: flex-end; gap: 8px; }
    .product-actions-list .availability-badge { position: static; }
    .product-card-compact { display: flex; align-items: center; gap: 12px; background: white; border-radius: 8px; padding: 8px; box-shadow: 0 1px 4px rgba(0,0,0,0.1); }
    .product-image-compact { width: 48px; height: 48px; object-fit: cover; border-radius: 4px; }
    .product-title-compact { font-size: 14px; font-weight: 600; color: #333; }
    .product-pricing-compact .product-price, .product-pricing-compact .product-price-sale { font-size: 14px; }"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(extra: serde_json::Value) -> ProductCard {
        let mut raw = json!({
            "id": "P1",
            "title": "Headphones",
            "description": "Noise cancelling",
            "link": "https://example.com/p1",
            "image_link": "https://example.com/p1.jpg",
            "price": "349.99 USD",
            "availability": "in_stock"
        });
        if let (Some(base), Some(extra)) = (raw.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_discount_badge_rounds() {
        let html = render(&product(json!({"sale_price": "299.99 USD"})), DisplayMode::Card);
        assert!(html.contains("14% OFF"));
        assert!(html.contains("$299.99"));
    }

    #[test]
    fn test_no_discount_when_sale_not_lower() {
        let html = render(&product(json!({"sale_price": "349.99 USD"})), DisplayMode::Card);
        assert!(!html.contains("% OFF"));
        assert!(!html.contains("product-price-sale\""));
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(4.5), "★★★★⯨");
        assert_eq!(stars(3.2), "★★★☆☆");
        assert_eq!(stars(0.0), "☆☆☆☆☆");
    }

    #[test]
    fn test_availability_badges() {
        assert!(availability_badge(Availability::InStock, Some(12)).contains("12 in stock"));
        assert!(availability_badge(Availability::InStock, None).contains("In Stock"));
        assert!(availability_badge(Availability::Preorder, None).contains("Pre-order"));
    }

    #[test]
    fn test_modes_differ() {
        let p = product(json!({"description": "x".repeat(300)}));
        let card = render(&p, DisplayMode::Card);
        let list = render(&p, DisplayMode::List);
        let compact = render(&p, DisplayMode::Compact);
        assert!(card.contains(&format!("{}...", "x".repeat(100))));
        assert!(list.contains(&format!("{}...", "x".repeat(200))));
        assert!(compact.contains("product-card-compact"));
        assert!(!compact.contains("xxxxxxxxxx"));
    }

    #[test]
    fn test_tabs_from_fields() {
        let html = render(&product(json!({"material": "Aluminium", "gtin": "12345678"})), DisplayMode::Card);
        assert!(html.contains("data-tab=\"features\""));
        assert!(html.contains("data-tab=\"specs\""));
        assert!(html.contains("Aluminium"));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(999), "999");
    }
}
