diesel::table! {
    admins (id) {
        id -> Integer,
        name -> Text,
        hashed_password -> Text,
    }
}

diesel::table! {
    users (id) {
        id -> Integer,
        name -> Text,
        cellphone -> Text,
        email -> Nullable<Text>,
        position -> Nullable<Text>,
        image_path -> Text,
        encoding -> Binary,
    }
}

diesel::table! {
    user_logs (id) {
        id -> Integer,
        user_id -> Integer,
        log_time -> Timestamp,
    }
}

diesel::joinable!(user_logs -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(admins, users, user_logs,);
