use std::collections::HashSet;

#[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
pub struct MongoUserModel {
    pub id: String,
    pub role: String,
    pub name: String,
    pub email: String,
    pub favorites: HashSet<String>,
    pub favorites_size: i64,
    pub joined: HashSet<String>,
    pub joined_size: i64,
}

#[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
pub struct MongoCourseModel {
    pub id: String,
    pub title: MongoLocalizedModel,
    pub description: MongoLocalizedModel,
    pub creator: MongoLocalizedModel,
    pub price: f64,
    pub categories: Vec<MongoLocalizedModel>,
    pub image: String,
    pub popular: bool,
    pub rating: f64,
}

#[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
pub struct MongoLocalizedModel {
    pub en: String,
    pub ar: Option<String>,
}
