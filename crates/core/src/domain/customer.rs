use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::line::Category;

/// Per-category trailing sales for a customer, consumed by the pricing service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorySales {
    #[serde(rename = "sales_s_cust")]
    pub sealant: Decimal,
    #[serde(rename = "sales_g_cust")]
    pub glass: Decimal,
    #[serde(rename = "sales_a_cust")]
    pub aluminium: Decimal,
    #[serde(rename = "sales_c_cust")]
    pub c_line: Decimal,
    #[serde(rename = "sales_e_cust")]
    pub accessories: Decimal,
    #[serde(rename = "sales_y_cust")]
    pub gypsum: Decimal,
}

impl CategorySales {
    pub fn for_category(&self, category: &Category) -> Decimal {
        match category {
            Category::Sealant => self.sealant,
            Category::Glass => self.glass,
            Category::Aluminium => self.aluminium,
            Category::CLine => self.c_line,
            Category::Accessories => self.accessories,
            Category::Gypsum => self.gypsum,
            Category::Other(_) => Decimal::ZERO,
        }
    }
}

/// Customer reference held by a draft. The cart never edits it in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerRef {
    pub id: String,
    pub code: String,
    pub name: String,
    pub phone: String,
    pub payment_terms: String,
    pub payment_method: String,
    pub gen_bus: String,
    pub customer_date: String,
    pub accum_6m: Decimal,
    pub frequency: Decimal,
    #[serde(flatten)]
    pub sales: CategorySales,
    /// Set for references restored from a draft that still need a full lookup.
    pub needs_hydrate: bool,
}

impl CustomerRef {
    pub fn customer_code(&self) -> &str {
        let id = self.id.trim();
        if !id.is_empty() {
            return id;
        }
        self.code.trim()
    }

    pub fn is_walk_in(&self) -> bool {
        let code = self.customer_code();
        code.is_empty() || code.eq_ignore_ascii_case("N/A")
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{CategorySales, CustomerRef};
    use crate::domain::line::Category;

    #[test]
    fn customer_code_prefers_id_then_code() {
        let mut customer = CustomerRef { code: " C-100 ".to_owned(), ..CustomerRef::default() };
        assert_eq!(customer.customer_code(), "C-100");

        customer.id = "C-200".to_owned();
        assert_eq!(customer.customer_code(), "C-200");
        assert!(!customer.is_walk_in());

        let walk_in = CustomerRef { id: "n/a".to_owned(), ..CustomerRef::default() };
        assert!(walk_in.is_walk_in());
    }

    #[test]
    fn sales_figures_are_selected_by_category() {
        let sales = CategorySales {
            glass: Decimal::new(120_000, 0),
            gypsum: Decimal::new(4_500, 0),
            ..CategorySales::default()
        };

        assert_eq!(sales.for_category(&Category::Glass), Decimal::new(120_000, 0));
        assert_eq!(sales.for_category(&Category::Gypsum), Decimal::new(4_500, 0));
        assert_eq!(sales.for_category(&Category::Other("Z".to_owned())), Decimal::ZERO);
    }

    #[test]
    fn deserializes_flat_sales_fields() {
        let customer: CustomerRef = serde_json::from_str(
            r#"{"id":"C-1","name":"Siam Glass","sales_g_cust":"9000","sales_a_cust":"12"}"#,
        )
        .expect("customer json");

        assert_eq!(customer.sales.glass, Decimal::new(9_000, 0));
        assert_eq!(customer.sales.aluminium, Decimal::new(12, 0));
        assert_eq!(customer.phone, "");
    }
}
