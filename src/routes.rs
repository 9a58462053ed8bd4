//! Page routes of the demo application.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Reminders,
    Schedule,
    Order,
    HelperReminders,
    Sos,
    SosContacts,
    MedicalMap,
    NotFound,
}

impl Route {
    /// Every routable page, in menu order.
    pub const ALL: [Route; 8] = [
        Route::Home,
        Route::Reminders,
        Route::Schedule,
        Route::Order,
        Route::HelperReminders,
        Route::Sos,
        Route::SosContacts,
        Route::MedicalMap,
    ];

    /// Maps a URL path to its page. Query strings and a trailing slash are ignored.
    pub fn resolve(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        match path {
            "/" => Route::Home,
            "/demo/reminders" => Route::Reminders,
            "/demo/schedule" => Route::Schedule,
            "/demo/order" => Route::Order,
            "/demo/helper-reminders" => Route::HelperReminders,
            "/demo/sos" => Route::Sos,
            "/demo/sos/contacts" => Route::SosContacts,
            "/demo/medical-map" => Route::MedicalMap,
            _ => Route::NotFound,
        }
    }

    /// Canonical path; `None` for [`Route::NotFound`].
    pub fn path(&self) -> Option<&'static str> {
        match self {
            Route::Home => Some("/"),
            Route::Reminders => Some("/demo/reminders"),
            Route::Schedule => Some("/demo/schedule"),
            Route::Order => Some("/demo/order"),
            Route::HelperReminders => Some("/demo/helper-reminders"),
            Route::Sos => Some("/demo/sos"),
            Route::SosContacts => Some("/demo/sos/contacts"),
            Route::MedicalMap => Some("/demo/medical-map"),
            Route::NotFound => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Reminders => "Medicine Reminders",
            Route::Schedule => "Schedule",
            Route::Order => "Order Medicines",
            Route::HelperReminders => "Helper Reminders",
            Route::Sos => "SOS",
            Route::SosContacts => "SOS Contacts",
            Route::MedicalMap => "Nearby Hospitals & Pharmacies",
            Route::NotFound => "Page Not Found",
        }
    }
}

impl Default for Route {
    fn default() -> Self {
        Route::Home
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
