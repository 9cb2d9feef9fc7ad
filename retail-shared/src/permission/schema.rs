//! Permission schema
//!
//! One typed record per business module. Every record carries the four CRUD
//! levels (`view`, `create`, `edit`, `delete`) followed by module specific
//! fields, each of which is either a flag (`bool`) or a graded
//! [`AccessLevel`]. Field names on the wire are camelCase and are re-encoded
//! verbatim by the string-array codec, so the declaration order and the
//! names below are part of the wire format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::access_level::AccessLevel;

/// Value type of a permission field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Feature on/off
    Flag,
    /// Graded access
    Level,
}

/// Entry of a module's field table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Typed value of a single permission field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Flag(bool),
    Level(AccessLevel),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Flag(_) => FieldKind::Flag,
            Self::Level(_) => FieldKind::Level,
        }
    }

    /// True for `Flag(true)` and any level above `None`
    pub fn is_granted(&self) -> bool {
        match self {
            Self::Flag(on) => *on,
            Self::Level(level) => !level.is_none(),
        }
    }
}

/// Field access shared by every module record
pub trait ModulePermissions: fmt::Debug {
    /// Field table in declaration order
    fn fields(&self) -> &'static [FieldSpec];

    /// Read a field by wire name
    fn get(&self, field: &str) -> Option<FieldValue>;

    /// Write a field by wire name
    ///
    /// Returns `false` when the field does not exist or the value kind does
    /// not match the field kind; the record is left untouched in that case.
    fn set(&mut self, field: &str, value: FieldValue) -> bool;

    /// Kind of a field, if the module has it
    fn field_kind(&self, field: &str) -> Option<FieldKind> {
        self.fields()
            .iter()
            .find(|spec| spec.name == field)
            .map(|spec| spec.kind)
    }

    /// True when at least one field is granted
    fn has_any(&self) -> bool {
        self.fields()
            .iter()
            .filter_map(|spec| self.get(spec.name))
            .any(|value| value.is_granted())
    }
}

macro_rules! field_type {
    (Flag) => { bool };
    (Level) => { AccessLevel };
}

macro_rules! module_permissions {
    (@impl
        $(#[$meta:meta])*
        $name:ident {
            $( $field:ident : $wire:literal => $kind:ident, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            $(
                #[serde(rename = $wire)]
                pub $field: field_type!($kind),
            )*
        }

        impl $name {
            pub const FIELDS: &'static [FieldSpec] = &[
                $( FieldSpec { name: $wire, kind: FieldKind::$kind }, )*
            ];
        }

        impl ModulePermissions for $name {
            fn fields(&self) -> &'static [FieldSpec] {
                Self::FIELDS
            }

            fn get(&self, field: &str) -> Option<FieldValue> {
                match field {
                    $( $wire => Some(FieldValue::$kind(self.$field)), )*
                    _ => None,
                }
            }

            fn set(&mut self, field: &str, value: FieldValue) -> bool {
                match (field, value) {
                    $(
                        ($wire, FieldValue::$kind(v)) => {
                            self.$field = v;
                            true
                        }
                    )*
                    _ => false,
                }
            }
        }
    };
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $field:ident : $wire:literal => $kind:ident ),* $(,)?
        }
    ) => {
        module_permissions!(@impl $(#[$meta])* $name {
            view: "view" => Level,
            create: "create" => Level,
            edit: "edit" => Level,
            delete: "delete" => Level,
            $( $field: $wire => $kind, )*
        });
    };
}

module_permissions! {
    /// Point-of-sale transactions
    SalesPermissions {
        process_refunds: "processRefunds" => Flag,
        apply_discounts: "applyDiscounts" => Flag,
        void_transactions: "voidTransactions" => Flag,
        view_sales_history: "viewSalesHistory" => Level,
    }
}

module_permissions! {
    /// Stock and catalog
    InventoryPermissions {
        adjust_stock: "adjustStock" => Flag,
        transfer_stock: "transferStock" => Flag,
        manage_categories: "manageCategories" => Flag,
        view_stock_levels: "viewStockLevels" => Level,
    }
}

module_permissions! {
    /// Employees, schedules and roles
    StaffPermissions {
        manage_schedules: "manageSchedules" => Flag,
        manage_roles: "manageRoles" => Flag,
        assign_permissions: "assignPermissions" => Flag,
        view_performance: "viewPerformance" => Level,
    }
}

module_permissions! {
    ReportsPermissions {
        export: "export" => Level,
        view_sales_reports: "viewSalesReports" => Level,
        view_financial_reports: "viewFinancialReports" => Level,
        schedule_reports: "scheduleReports" => Flag,
    }
}

module_permissions! {
    SettingsPermissions {
        manage_system_settings: "manageSystemSettings" => Flag,
        manage_integrations: "manageIntegrations" => Flag,
        manage_backups: "manageBackups" => Flag,
    }
}

module_permissions! {
    /// Accounts, revenue and payments
    FinancialPermissions {
        approve: "approve" => Level,
        view_revenue: "viewRevenue" => Level,
        manage_accounts: "manageAccounts" => Flag,
        process_payments: "processPayments" => Flag,
    }
}

module_permissions! {
    CustomersPermissions {
        view_customer_data: "viewCustomerData" => Level,
        manage_loyalty: "manageLoyalty" => Flag,
        export_customer_data: "exportCustomerData" => Flag,
    }
}

module_permissions! {
    ShopsPermissions {
        manage_shop_settings: "manageShopSettings" => Flag,
        view_all_shops: "viewAllShops" => Flag,
        transfer_between_shops: "transferBetweenShops" => Flag,
    }
}

module_permissions! {
    MarketsPermissions {
        manage_markets: "manageMarkets" => Flag,
        view_market_analytics: "viewMarketAnalytics" => Level,
    }
}

module_permissions! {
    ExpensesPermissions {
        approve: "approve" => Level,
        view_all_expenses: "viewAllExpenses" => Level,
        submit_expenses: "submitExpenses" => Flag,
    }
}

module_permissions! {
    /// Repair tickets
    RepairsPermissions {
        assign_technicians: "assignTechnicians" => Flag,
        update_repair_status: "updateRepairStatus" => Flag,
        view_repair_history: "viewRepairHistory" => Level,
    }
}

module_permissions! {
    SuppliersPermissions {
        manage_purchase_orders: "managePurchaseOrders" => Flag,
        approve_purchase_orders: "approvePurchaseOrders" => Flag,
        view_supplier_history: "viewSupplierHistory" => Level,
    }
}

/// Business module a permission record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKey {
    Sales,
    Inventory,
    Staff,
    Reports,
    Settings,
    Financial,
    Customers,
    Shops,
    Markets,
    Expenses,
    Repairs,
    Suppliers,
}

impl ModuleKey {
    /// Declaration order; the encoder walks modules in this order
    pub const ALL: [ModuleKey; 12] = [
        ModuleKey::Sales,
        ModuleKey::Inventory,
        ModuleKey::Staff,
        ModuleKey::Reports,
        ModuleKey::Settings,
        ModuleKey::Financial,
        ModuleKey::Customers,
        ModuleKey::Shops,
        ModuleKey::Markets,
        ModuleKey::Expenses,
        ModuleKey::Repairs,
        ModuleKey::Suppliers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Inventory => "inventory",
            Self::Staff => "staff",
            Self::Reports => "reports",
            Self::Settings => "settings",
            Self::Financial => "financial",
            Self::Customers => "customers",
            Self::Shops => "shops",
            Self::Markets => "markets",
            Self::Expenses => "expenses",
            Self::Repairs => "repairs",
            Self::Suppliers => "suppliers",
        }
    }

    /// Look a module up by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// Field table of this module
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Self::Sales => SalesPermissions::FIELDS,
            Self::Inventory => InventoryPermissions::FIELDS,
            Self::Staff => StaffPermissions::FIELDS,
            Self::Reports => ReportsPermissions::FIELDS,
            Self::Settings => SettingsPermissions::FIELDS,
            Self::Financial => FinancialPermissions::FIELDS,
            Self::Customers => CustomersPermissions::FIELDS,
            Self::Shops => ShopsPermissions::FIELDS,
            Self::Markets => MarketsPermissions::FIELDS,
            Self::Expenses => ExpensesPermissions::FIELDS,
            Self::Repairs => RepairsPermissions::FIELDS,
            Self::Suppliers => SuppliersPermissions::FIELDS,
        }
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown permission module: {}", s))
    }
}

/// CRUD summary shared by every module
///
/// `export` and `approve` are only filled for modules that define them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionItem {
    pub view: AccessLevel,
    pub create: AccessLevel,
    pub edit: AccessLevel,
    pub delete: AccessLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<AccessLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approve: Option<AccessLevel>,
}

impl PermissionItem {
    fn from_module(module: &dyn ModulePermissions) -> Self {
        let level = |field: &str| match module.get(field) {
            Some(FieldValue::Level(level)) => Some(level),
            _ => None,
        };
        Self {
            view: level("view").unwrap_or_default(),
            create: level("create").unwrap_or_default(),
            edit: level("edit").unwrap_or_default(),
            delete: level("delete").unwrap_or_default(),
            export: level("export"),
            approve: level("approve"),
        }
    }
}

/// Full permission set of a role
///
/// Always total: deserializing JSON that lacks a module (or a field) yields
/// the default, allow-nothing record for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub sales: SalesPermissions,
    pub inventory: InventoryPermissions,
    pub staff: StaffPermissions,
    pub reports: ReportsPermissions,
    pub settings: SettingsPermissions,
    pub financial: FinancialPermissions,
    pub customers: CustomersPermissions,
    pub shops: ShopsPermissions,
    pub markets: MarketsPermissions,
    pub expenses: ExpensesPermissions,
    pub repairs: RepairsPermissions,
    pub suppliers: SuppliersPermissions,
}

impl Permissions {
    pub fn module(&self, key: ModuleKey) -> &dyn ModulePermissions {
        match key {
            ModuleKey::Sales => &self.sales,
            ModuleKey::Inventory => &self.inventory,
            ModuleKey::Staff => &self.staff,
            ModuleKey::Reports => &self.reports,
            ModuleKey::Settings => &self.settings,
            ModuleKey::Financial => &self.financial,
            ModuleKey::Customers => &self.customers,
            ModuleKey::Shops => &self.shops,
            ModuleKey::Markets => &self.markets,
            ModuleKey::Expenses => &self.expenses,
            ModuleKey::Repairs => &self.repairs,
            ModuleKey::Suppliers => &self.suppliers,
        }
    }

    pub fn module_mut(&mut self, key: ModuleKey) -> &mut dyn ModulePermissions {
        match key {
            ModuleKey::Sales => &mut self.sales,
            ModuleKey::Inventory => &mut self.inventory,
            ModuleKey::Staff => &mut self.staff,
            ModuleKey::Reports => &mut self.reports,
            ModuleKey::Settings => &mut self.settings,
            ModuleKey::Financial => &mut self.financial,
            ModuleKey::Customers => &mut self.customers,
            ModuleKey::Shops => &mut self.shops,
            ModuleKey::Markets => &mut self.markets,
            ModuleKey::Expenses => &mut self.expenses,
            ModuleKey::Repairs => &mut self.repairs,
            ModuleKey::Suppliers => &mut self.suppliers,
        }
    }

    /// Read `module.action`; `None` for unknown modules or fields
    pub fn get(&self, module: &str, action: &str) -> Option<FieldValue> {
        let key = ModuleKey::from_name(module)?;
        self.module(key).get(action)
    }

    /// Set `module.action` from a permission edit screen
    ///
    /// Returns `false` (and changes nothing) for unknown modules, unknown
    /// fields or a value of the wrong kind.
    pub fn set(&mut self, module: &str, action: &str, value: FieldValue) -> bool {
        match ModuleKey::from_name(module) {
            Some(key) => self.module_mut(key).set(action, value),
            None => false,
        }
    }

    /// CRUD summary of one module
    pub fn item(&self, key: ModuleKey) -> PermissionItem {
        PermissionItem::from_module(self.module(key))
    }

    /// True when nothing is granted anywhere
    pub fn is_empty(&self) -> bool {
        ModuleKey::ALL
            .iter()
            .all(|key| !self.module(*key).has_any())
    }
}

/// Fresh allow-nothing permission set
pub fn get_default_permissions() -> Permissions {
    Permissions::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_is_empty() {
        let perms = get_default_permissions();
        assert!(perms.is_empty());
        for key in ModuleKey::ALL {
            for spec in key.fields() {
                let value = perms.module(key).get(spec.name).unwrap();
                assert!(!value.is_granted(), "{}.{}", key, spec.name);
            }
        }
    }

    #[test]
    fn test_default_returns_independent_values() {
        let mut first = get_default_permissions();
        first.sales.view = AccessLevel::All;
        let second = get_default_permissions();
        assert_eq!(second.sales.view, AccessLevel::None);
    }

    #[test]
    fn test_field_tables_start_with_crud() {
        for key in ModuleKey::ALL {
            let names: Vec<_> = key.fields().iter().take(4).map(|f| f.name).collect();
            assert_eq!(names, ["view", "create", "edit", "delete"], "{}", key);
        }
    }

    #[test]
    fn test_field_names_unique_per_module() {
        for key in ModuleKey::ALL {
            let names: HashSet<_> = key.fields().iter().map(|f| f.name).collect();
            assert_eq!(names.len(), key.fields().len(), "{}", key);
        }
    }

    #[test]
    fn test_module_table_matches_record() {
        let perms = Permissions::default();
        for key in ModuleKey::ALL {
            assert_eq!(perms.module(key).fields(), key.fields());
        }
    }

    #[test]
    fn test_set_and_get() {
        let mut perms = Permissions::default();
        assert!(perms.set("sales", "processRefunds", FieldValue::Flag(true)));
        assert!(perms.set("sales", "viewSalesHistory", FieldValue::Level(AccessLevel::Department)));
        assert!(perms.sales.process_refunds);
        assert_eq!(perms.sales.view_sales_history, AccessLevel::Department);
        assert_eq!(perms.get("sales", "processRefunds"), Some(FieldValue::Flag(true)));
    }

    #[test]
    fn test_set_rejects_kind_mismatch_and_unknown() {
        let mut perms = Permissions::default();
        assert!(!perms.set("sales", "processRefunds", FieldValue::Level(AccessLevel::All)));
        assert!(!perms.set("sales", "bogus", FieldValue::Flag(true)));
        assert!(!perms.set("bogus", "view", FieldValue::Level(AccessLevel::All)));
        assert_eq!(perms, Permissions::default());
    }

    #[test]
    fn test_module_from_name() {
        assert_eq!(ModuleKey::from_name("repairs"), Some(ModuleKey::Repairs));
        assert_eq!(ModuleKey::from_name("Repairs"), None);
        assert!("administrator".parse::<ModuleKey>().is_err());
    }

    #[test]
    fn test_permission_item() {
        let mut perms = Permissions::default();
        perms.reports.view = AccessLevel::All;
        perms.reports.export = AccessLevel::SelfOnly;

        let item = perms.item(ModuleKey::Reports);
        assert_eq!(item.view, AccessLevel::All);
        assert_eq!(item.export, Some(AccessLevel::SelfOnly));
        assert_eq!(item.approve, None);

        let item = perms.item(ModuleKey::Expenses);
        assert_eq!(item.approve, Some(AccessLevel::None));
        assert_eq!(item.export, None);
    }

    #[test]
    fn test_json_is_total() {
        let perms: Permissions =
            serde_json::from_value(serde_json::json!({ "sales": { "view": "all" } })).unwrap();
        assert_eq!(perms.sales.view, AccessLevel::All);
        assert_eq!(perms.inventory, InventoryPermissions::default());
    }

    #[test]
    fn test_json_uses_wire_names() {
        let mut perms = Permissions::default();
        perms.inventory.adjust_stock = true;
        let value = serde_json::to_value(&perms).unwrap();
        assert_eq!(value["inventory"]["adjustStock"], serde_json::json!(true));
        assert_eq!(value["inventory"]["view"], serde_json::json!("none"));
    }
}
