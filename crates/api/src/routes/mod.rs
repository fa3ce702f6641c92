pub mod fire_alarm;
pub mod users;
