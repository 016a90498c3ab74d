// src/config/consts.rs

// Net config
pub const USER_AGENT: &str = concat!("xcheck/", env!("CARGO_PKG_VERSION"));
pub const TIMEOUT_SECS: u64 = 15;

// Source names
pub const REGISTRY_HOME: &str = "IATI Registry";
pub const DASH_HOME: &str = "IATI Dashboard - Homepage";
pub const DASH_PUBLISHERS: &str = "IATI Dashboard - Publisher Page";
pub const DASH_ACTIVITIES: &str = "IATI Dashboard - Activities Page";
pub const DATASTORE_ACTIVITY_COUNT: &str = "Datastore API - Activity Count";

// Source URLs
pub const REGISTRY_HOME_URL: &str = "https://iatiregistry.org/";
pub const DASH_HOME_URL: &str = "http://dashboard.iatistandard.org/";
pub const DASH_PUBLISHERS_URL: &str = "http://dashboard.iatistandard.org/publishers.html";
pub const DASH_ACTIVITIES_URL: &str = "http://dashboard.iatistandard.org/activities.html";
pub const DATASTORE_ACTIVITY_COUNT_URL: &str =
    "http://datastore.iatistandard.org/api/1/access/activity.xml?limit=0";
pub const DATASTORE_MIN_RESPONSE_SIZE: usize = 300;

// Locators
pub const DASH_HOME_ACTIVITIES_XPATH: &str =
    r#"//*[@id="wrap"]/div[2]/div[2]/div[1]/div[2]/table/tbody/tr[1]/td[1]/a"#;
pub const DASH_HOME_UNIQUE_ACTIVITIES_XPATH: &str =
    r#"//*[@id="wrap"]/div[2]/div[2]/div[1]/div[2]/table/tbody/tr[2]/td[1]/a"#;
pub const DASH_HOME_PUBLISHERS_XPATH: &str =
    r#"//*[@id="wrap"]/div[2]/div[2]/div[1]/div[2]/table/tbody/tr[3]/td[1]/a"#;
pub const DASH_ACTIVITIES_XPATH: &str = r#"//*[@id="wrap"]/div[2]/div[2]/div[1]/div/div[1]/h3/span[1]"#;
pub const DASH_ACTIVITIES_UNIQUE_XPATH: &str = r#"//*[@id="wrap"]/div[2]/div[2]/div[2]/div/div[1]/h3/span[1]"#;
pub const DASH_PUBLISHERS_XPATH: &str = r#"//*[@id="wrap"]/div[2]/div[2]/div[1]/div/div[1]/h3/span[1]"#;
pub const DATASTORE_TOTAL_COUNT_XPATH: &str = "//result/iati-activities/query/total-count";
pub const REGISTRY_PUBLISHERS_XPATH: &str = r#"//*[@id="home-icons"]/div/div[2]/div/a/strong"#;

// Thresholds
pub const MIN_ACTIVITY_COUNT: u64 = 550_000;
pub const MAX_DATASTORE_DISPARITY: f64 = 0.1;
pub const MIN_PUBLISHER_COUNT: u64 = 480;
pub const MAX_REGISTRY_DISPARITY: f64 = 0.01;

// Facet search
pub const ACTIVITY_FACET_URL: &str = "https://iatiregistry.org/api/3/action/package_search?q=extras_filetype:activity&facet.field=[%22extras_activity_count%22]&start=0&rows=0&facet.limit=1000000";
pub const ACTIVITY_FACET_FIELD: &str = "extras_activity_count";

// Logging
pub const DEFAULT_LOG_FILE: &str = ".store/debug.log";
