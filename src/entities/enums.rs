//! Enumerazioni - Tipi enumerati utilizzati nelle entità

use serde::{Deserialize, Serialize};

// ********************* ENUMERAZIONI UTILI **********************//

/// Ruolo applicativo dell'utente, persistito come `users.role_id`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[repr(i32)]
pub enum Role {
    Admin = 1,
    Manager = 2,
    Client = 3,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Client];

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }

    /// Lower rank means more privileges
    fn rank(self) -> u8 {
        match self {
            Role::Admin => 0,
            Role::Manager => 1,
            Role::Client => 2,
        }
    }

    /// Role matrix: an actor manages only roles strictly below its own.
    /// Clients manage nobody.
    pub fn can_manage(self, target: Role) -> bool {
        self != Role::Client && self.rank() < target.rank()
    }

    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientType {
    Individual,
    LegalEntity,
}

/// Stato dell'ordine, persistito come `orders.status_id`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum OrderStatus {
    Pending = 1,
    Confirmed = 2,
    InProgress = 3,
    Shipped = 4,
    Completed = 5,
    Cancelled = 6,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InProgress,
        OrderStatus::Shipped,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.id() == id)
    }

    /// A client may still withdraw the order
    pub fn is_cancellable(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }
}
