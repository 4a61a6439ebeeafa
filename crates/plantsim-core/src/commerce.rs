//! Market-facing entities: consumers, tenders, suppliers, and the closed
//! strategy choices a player makes each step.

use crate::error::SimError;
use crate::fixed::Fixed64;
use crate::id::{ConsumerId, SupplierId, TenderId, identity_keyed};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Closed tag sets
// ---------------------------------------------------------------------------

/// Declares a closed set of tags with a fixed wire value per variant.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident default $default:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The declared wire value.
            pub fn as_wire(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_wire())
            }
        }

        impl std::str::FromStr for $name {
            type Err = SimError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(SimError::InvalidArgument(format!(
                        "unknown {} '{}'; expected one of: {}",
                        stringify!($name),
                        other,
                        [$($wire),+].join(", ")
                    ))),
                }
            }
        }
    };
}

pub(crate) use wire_enum;

wire_enum! {
    /// How the plant wins and prices its sales.
    SalesStrategy default LowPrices {
        LowPrices => "LOW_PRICES",
        HighQuality => "HIGH_QUALITY",
        Advertising => "ADVERTISING",
        Partnerships => "PARTNERSHIPS",
    }
}

wire_enum! {
    /// What happens to defective output.
    DealingWithDefects default Rework {
        Dispose => "DISPOSE",
        Rework => "REWORK",
        SellAtDiscount => "SELL_AT_DISCOUNT",
    }
}

wire_enum! {
    /// How finished products reach consumers.
    DistributionStrategy default Direct {
        Direct => "DIRECT",
        Wholesale => "WHOLESALE",
        Retail => "RETAIL",
        Mixed => "MIXED",
    }
}

impl SalesStrategy {
    /// Revenue multiplier applied by the default metrics deriver.
    pub fn revenue_factor(self) -> Fixed64 {
        match self {
            SalesStrategy::LowPrices => crate::fixed::ratio(90, 100),
            SalesStrategy::HighQuality => crate::fixed::ratio(110, 100),
            SalesStrategy::Advertising => crate::fixed::ratio(105, 100),
            SalesStrategy::Partnerships => Fixed64::ONE,
        }
    }
}

// ---------------------------------------------------------------------------
// Consumer & tender
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consumer {
    pub consumer_id: ConsumerId,
    pub name: String,
    pub is_government: bool,
}

identity_keyed!(Consumer, consumer_id);

impl Consumer {
    pub fn new(consumer_id: impl Into<ConsumerId>, name: impl Into<String>) -> Self {
        Self {
            consumer_id: consumer_id.into(),
            name: name.into(),
            is_government: false,
        }
    }
}

/// A production order accepted from a consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tender {
    pub tender_id: TenderId,
    pub name: String,
    pub consumer: Consumer,
    /// Contract value paid on delivery.
    pub cost: i64,
    pub quantity_of_products: u64,
}

identity_keyed!(Tender, tender_id);

impl Tender {
    pub fn new(
        tender_id: impl Into<TenderId>,
        consumer: Consumer,
        cost: i64,
        quantity_of_products: u64,
    ) -> Self {
        let tender_id = tender_id.into();
        Self {
            name: tender_id.to_string(),
            tender_id,
            consumer,
            cost,
            quantity_of_products,
        }
    }
}

// ---------------------------------------------------------------------------
// Supplier
// ---------------------------------------------------------------------------

/// Default lead time for a newly registered supplier.
pub const DEFAULT_DELIVERY_PERIOD_DAYS: u32 = 7;

/// A material supplier. Reliability and quality are ratios in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub supplier_id: SupplierId,
    pub name: String,
    pub material_type: String,
    pub reliability: Fixed64,
    pub product_quality: Fixed64,
    /// Material cost per step.
    pub cost: i64,
    pub delivery_cost: i64,
    pub quality_inspection_enabled: bool,
    pub delivery_period_days: u32,
}

identity_keyed!(Supplier, supplier_id);

impl Supplier {
    pub fn new(supplier_id: impl Into<SupplierId>, name: impl Into<String>) -> Self {
        Self {
            supplier_id: supplier_id.into(),
            name: name.into(),
            material_type: String::new(),
            reliability: Fixed64::ONE,
            product_quality: Fixed64::ONE,
            cost: 0,
            delivery_cost: 0,
            quality_inspection_enabled: false,
            delivery_period_days: DEFAULT_DELIVERY_PERIOD_DAYS,
        }
    }

    /// Total procurement spend for one step.
    pub fn step_cost(&self) -> i64 {
        self.cost.saturating_add(self.delivery_cost)
    }
}
