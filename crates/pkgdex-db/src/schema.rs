diesel::table! {
    packages (name) {
        name -> Text,
        repo_name -> Text,
        repo_location -> Text,
        url -> Text,
        app_yaml -> Nullable<Text>,
        package_json -> Nullable<Text>,
        readme -> Nullable<Text>,
        icon -> Nullable<Text>,
    }
}
