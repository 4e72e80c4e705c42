use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::{insert_into, prelude::*, update, PgConnection};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Order, OrderLineItem, OrderStatus, PaymentMethod, Product};
use crate::schema;

pub struct OrderDraft {
    pub firstname: String,
    pub lastname: String,
    pub phonenumber: String,
    pub address: String,
    pub payment_method: PaymentMethod,
    pub comment: String,
    pub positions: Vec<OrderPosition>,
}

pub struct OrderPosition {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Order must contain at least one position")]
    EmptyOrder,
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i32),
    #[error("Unknown product {0}")]
    UnknownProduct(Uuid),
    #[error("Unexpected internal error")]
    Internal(#[from] diesel::result::Error),
}

/// Creates the order and its line items in one transaction. Each line item
/// snapshots the product's current price into `item_price`, so later price
/// changes do not rewrite history.
pub fn register_order(conn: &mut PgConnection, draft: OrderDraft) -> Result<Order, OrderError> {
    validate(&draft)?;

    conn.transaction(|conn| {
        let product_ids: Vec<Uuid> = draft.positions.iter().map(|p| p.product_id).collect();
        let prices: HashMap<Uuid, BigDecimal> = schema::products::table
            .filter(schema::products::id.eq_any(&product_ids))
            .select(Product::as_select())
            .load(conn)?
            .into_iter()
            .map(|product| (product.id, product.price))
            .collect();

        let order = Order {
            id: Uuid::new_v4(),
            firstname: draft.firstname,
            lastname: draft.lastname,
            phonenumber: draft.phonenumber,
            address: draft.address,
            status: OrderStatus::Unprocessed,
            payment_method: draft.payment_method,
            comment: draft.comment,
            registered_at: Utc::now(),
            called_at: None,
            delivered_at: None,
            restaurant_id: None,
            latitude: None,
            longitude: None,
        };

        let line_items = draft
            .positions
            .iter()
            .map(|position| {
                let item_price = prices
                    .get(&position.product_id)
                    .cloned()
                    .ok_or(OrderError::UnknownProduct(position.product_id))?;
                Ok(OrderLineItem {
                    id: Uuid::new_v4(),
                    order_id: order.id,
                    product_id: position.product_id,
                    quantity: position.quantity,
                    item_price,
                })
            })
            .collect::<Result<Vec<_>, OrderError>>()?;

        insert_into(schema::orders::table)
            .values(&order)
            .execute(conn)?;
        insert_into(schema::order_line_items::table)
            .values(&line_items)
            .execute(conn)?;

        Ok(order)
    })
}

pub fn set_status(
    conn: &mut PgConnection,
    order_id: Uuid,
    status: OrderStatus,
) -> Result<(), OrderError> {
    update(schema::orders::table.find(order_id))
        .set(schema::orders::status.eq(status))
        .execute(conn)?;
    Ok(())
}

/// Assigns (or clears) the restaurant chosen to fulfill the order.
pub fn assign_restaurant(
    conn: &mut PgConnection,
    order_id: Uuid,
    restaurant_id: Option<Uuid>,
) -> Result<(), OrderError> {
    update(schema::orders::table.find(order_id))
        .set(schema::orders::restaurant_id.eq(restaurant_id))
        .execute(conn)?;
    Ok(())
}

fn validate(draft: &OrderDraft) -> Result<(), OrderError> {
    if draft.positions.is_empty() {
        return Err(OrderError::EmptyOrder);
    }
    if let Some(position) = draft.positions.iter().find(|p| p.quantity < 1) {
        return Err(OrderError::InvalidQuantity(position.quantity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::establish_connection;

    fn draft(positions: Vec<OrderPosition>) -> OrderDraft {
        OrderDraft {
            firstname: "Василий".to_string(),
            lastname: "Васильевич".to_string(),
            phonenumber: "+79123456789".to_string(),
            address: "Лондон".to_string(),
            payment_method: PaymentMethod::Cash,
            comment: String::new(),
            positions,
        }
    }

    #[test]
    fn test_validate_rejects_empty_order() {
        assert!(matches!(
            validate(&draft(vec![])),
            Err(OrderError::EmptyOrder)
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_quantity() {
        let positions = vec![OrderPosition {
            product_id: Uuid::new_v4(),
            quantity: 0,
        }];
        assert!(matches!(
            validate(&draft(positions)),
            Err(OrderError::InvalidQuantity(0))
        ));
    }

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn test_register_order_snapshots_prices() {
        let conn = &mut establish_connection();
        let product = Product {
            id: Uuid::new_v4(),
            name: "Стейкхаус".to_string(),
            category_id: None,
            price: BigDecimal::parse_bytes(b"350.00", 10).unwrap(),
            description: String::new(),
            special_status: false,
        };
        insert_into(schema::products::table)
            .values(&product)
            .execute(conn)
            .unwrap();

        let order = register_order(
            conn,
            draft(vec![OrderPosition {
                product_id: product.id,
                quantity: 2,
            }]),
        )
        .unwrap();

        // Raising the product price must not touch the snapshot.
        update(schema::products::table.find(product.id))
            .set(schema::products::price.eq(BigDecimal::parse_bytes(b"999.00", 10).unwrap()))
            .execute(conn)
            .unwrap();

        let items: Vec<OrderLineItem> = schema::order_line_items::table
            .filter(schema::order_line_items::order_id.eq(order.id))
            .select(OrderLineItem::as_select())
            .load(conn)
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(
            items[0].item_price,
            BigDecimal::parse_bytes(b"350.00", 10).unwrap()
        );

        diesel::delete(
            schema::order_line_items::table
                .filter(schema::order_line_items::order_id.eq(order.id)),
        )
        .execute(conn)
        .unwrap();
        diesel::delete(schema::orders::table.find(order.id))
            .execute(conn)
            .unwrap();
        diesel::delete(schema::products::table.find(product.id))
            .execute(conn)
            .unwrap();
    }
}
