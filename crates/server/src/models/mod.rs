//! Domain types for carts, orders, and products.

pub mod cart;
pub mod order;
pub mod product;

pub use cart::{Cart, CartItem, CartWithItems};
pub use order::{
    ItemQuantity, NewOrder, NewOrderItem, Order, OrderItem, OrderWithItems, ShippingDetails,
    ShippingUpdate,
};
pub use product::Product;
