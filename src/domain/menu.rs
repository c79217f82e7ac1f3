//! Operations menu catalogue.

/// Screens reachable from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Scanning,
}

/// A menu tile. Tiles without a route are shown disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub title: &'static str,
    pub route: Option<Route>,
}

impl MenuItem {
    const fn enabled(title: &'static str, route: Route) -> Self {
        Self {
            title,
            route: Some(route),
        }
    }

    const fn disabled(title: &'static str) -> Self {
        Self { title, route: None }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.route.is_some()
    }
}

pub const MENU_ITEMS: [MenuItem; 14] = [
    MenuItem::enabled("Warehousing Scanning", Route::Scanning),
    MenuItem::disabled("Allocate Out Warehouse"),
    MenuItem::disabled("Allocate Into Warehouse"),
    MenuItem::disabled("Warehouse Delivery"),
    MenuItem::disabled("Box / Pallet Assembly"),
    MenuItem::disabled("Inventory Verification"),
    MenuItem::disabled("Allocate Return Into WH"),
    MenuItem::disabled("Pallet Search"),
    MenuItem::disabled("Not In Ware"),
    MenuItem::disabled("Delivery Return"),
    MenuItem::disabled("Distributor Return"),
    MenuItem::disabled("SN Return"),
    MenuItem::disabled("Delivery SAP"),
    MenuItem::disabled("Allocate Out SAP"),
];
