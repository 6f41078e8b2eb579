//! API response envelopes
//!
//! The backend is inconsistent about envelopes: restaurant and menu
//! listings come back as bare JSON arrays, while orders, coupons and
//! users are wrapped in a keyed object. These structs pin down the
//! wrapped shapes so decoding stays explicit at the call sites.

use serde::Deserialize;

use crate::models::{Coupon, Order, Profile};

/// `GET /order/get-all-restaurant-orders/{restaurantId}`
#[derive(Debug, Deserialize)]
pub struct OrdersEnvelope {
    pub orders: Vec<Order>,
}

/// `PATCH /order/update-order-status/{orderId}`
#[derive(Debug, Deserialize)]
pub struct OrderEnvelope {
    pub order: Order,
}

/// `GET /coupon/get-coupons`
#[derive(Debug, Deserialize)]
pub struct CouponsEnvelope {
    pub coupons: Vec<Coupon>,
}

/// `POST /coupon/create-coupon` and `PUT /coupon/update-coupon/{id}`
#[derive(Debug, Deserialize)]
pub struct CouponEnvelope {
    pub coupon: Coupon,
}

/// `GET /admin/get-all-users`
#[derive(Debug, Deserialize)]
pub struct UsersEnvelope {
    pub users: Vec<Profile>,
}

/// `PATCH /admin/update-user/{id}`
#[derive(Debug, Deserialize)]
pub struct UserEnvelope {
    pub user: Profile,
}

/// `POST /auth/login` and `POST /auth/signup`
#[derive(Debug, Deserialize)]
pub struct LoginEnvelope {
    pub user: Profile,
}
