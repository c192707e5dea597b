use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::catalog::{MenuItem, Restaurant, User};
use crate::models::partner::GeoPoint;
use crate::state::AppState;

// Collaborator surface: just enough user/restaurant/menu management for the
// dispatch core to resolve references against. No auth here.

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(register_user))
        .route("/users/:id", get(get_user))
        .route("/restaurants", post(add_restaurant).get(list_restaurants))
        .route("/restaurants/:id", get(get_restaurant))
        .route("/restaurants/:id/menu", post(add_menu_item).get(list_menu))
        .route("/menu/:item_id", put(update_menu_item))
}

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub full_name: String,
}

#[derive(Deserialize)]
pub struct AddRestaurantRequest {
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
}

#[derive(Deserialize)]
pub struct AddMenuItemRequest {
    pub name: String,
    pub price: f64,
}

#[derive(Deserialize)]
pub struct UpdateMenuItemRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
}

async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<Json<User>, AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("username cannot be empty".to_string()));
    }

    let user = User {
        id: Uuid::new_v4(),
        username: payload.username,
        full_name: payload.full_name,
    };

    state.users.insert(user.id, user.clone());
    Ok(Json(user))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let user = state
        .users
        .get(&id)
        .ok_or_else(|| AppError::not_found("user", id))?;

    Ok(Json(user.value().clone()))
}

async fn add_restaurant(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddRestaurantRequest>,
) -> Result<Json<Restaurant>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let restaurant = Restaurant {
        id: Uuid::new_v4(),
        name: payload.name,
        address: payload.address,
        location: payload.location,
    };

    state.restaurants.insert(restaurant.id, restaurant.clone());
    Ok(Json(restaurant))
}

async fn list_restaurants(State(state): State<Arc<AppState>>) -> Json<Vec<Restaurant>> {
    let restaurants = state
        .restaurants
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(restaurants)
}

async fn get_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Restaurant>, AppError> {
    let restaurant = state
        .restaurants
        .get(&id)
        .ok_or_else(|| AppError::not_found("restaurant", id))?;

    Ok(Json(restaurant.value().clone()))
}

async fn add_menu_item(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<Uuid>,
    Json(payload): Json<AddMenuItemRequest>,
) -> Result<Json<MenuItem>, AppError> {
    if !state.restaurants.contains_key(&restaurant_id) {
        return Err(AppError::not_found("restaurant", restaurant_id));
    }

    let item = MenuItem {
        id: Uuid::new_v4(),
        restaurant: restaurant_id,
        name: payload.name,
        price: payload.price,
    };

    state.menu_items.insert(item.id, item.clone());
    Ok(Json(item))
}

async fn list_menu(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<Vec<MenuItem>>, AppError> {
    if !state.restaurants.contains_key(&restaurant_id) {
        return Err(AppError::not_found("restaurant", restaurant_id));
    }

    let menu = state
        .menu_items
        .iter()
        .filter(|entry| entry.value().restaurant == restaurant_id)
        .map(|entry| entry.value().clone())
        .collect();

    Ok(Json(menu))
}

/// Edits the live menu. Prices already captured on placed orders are not
/// touched.
async fn update_menu_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateMenuItemRequest>,
) -> Result<Json<MenuItem>, AppError> {
    let mut item = state
        .menu_items
        .get_mut(&item_id)
        .ok_or_else(|| AppError::not_found("menu item", item_id))?;

    if let Some(name) = payload.name {
        item.name = name;
    }
    if let Some(price) = payload.price {
        item.price = price;
    }

    Ok(Json(item.clone()))
}
