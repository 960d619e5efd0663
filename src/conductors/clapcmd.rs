use anyhow::{bail, Result};
use clap::{Arg, ArgMatches, Command};

fn course_form_args(cmd: Command<'static>) -> Command<'static> {
    let opt = |name: &'static str| Arg::new(name).long(name).takes_value(true);

    cmd.arg(opt("title"))
        .arg(opt("title-ar"))
        .arg(opt("description"))
        .arg(opt("description-ar"))
        .arg(opt("creator"))
        .arg(opt("creator-ar"))
        .arg(opt("image"))
        .arg(opt("price"))
        .arg(opt("category"))
        .arg(opt("category-ar"))
        .arg(opt("rating"))
        .arg(Arg::new("popular").long("popular"))
}

pub fn create_cli() -> Command<'static> {
    Command::new("coursette")
        .version(env!("CARGO_PKG_VERSION"))
        .no_binary_name(true)
        .subcommand_required(true)
        .subcommand(
            Command::new("courses")
                .about("browse the course grid")
                .arg(
                    Arg::new("price")
                        .long("price")
                        .takes_value(true)
                        .possible_values(["asc", "desc", "none"]),
                )
                .arg(Arg::new("category").long("category").takes_value(true))
                .arg(Arg::new("search").long("search").takes_value(true))
                .arg(Arg::new("page").long("page").takes_value(true))
                .arg(Arg::new("popular").long("popular")),
        )
        .subcommand(
            Command::new("course")
                .about("course details")
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(
            Command::new("favorite")
                .about("toggle a course in your favorites")
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(
            Command::new("join")
                .about("join or unjoin a course")
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(Command::new("favorites").about("your favorite courses"))
        .subcommand(Command::new("joined").about("courses you joined"))
        .subcommand(
            Command::new("signup")
                .arg(Arg::new("name").long("name").takes_value(true).required(true))
                .arg(
                    Arg::new("email")
                        .long("email")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .long("password")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::new("role")
                        .long("role")
                        .takes_value(true)
                        .possible_values(["user", "admin"]),
                ),
        )
        .subcommand(
            Command::new("signin")
                .arg(
                    Arg::new("email")
                        .long("email")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .long("password")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .subcommand(Command::new("signout"))
        .subcommand(Command::new("whoami"))
        .subcommand(
            Command::new("lang")
                .about("switch the interface language")
                .arg(Arg::new("code").required(true)),
        )
        .subcommand(
            Command::new("admin")
                .subcommand_required(true)
                .subcommand(
                    Command::new("courses").arg(Arg::new("page").long("page").takes_value(true)),
                )
                .subcommand(course_form_args(Command::new("add-course")))
                .subcommand(
                    course_form_args(Command::new("edit-course"))
                        .arg(Arg::new("id").required(true)),
                )
                .subcommand(Command::new("delete-course").arg(Arg::new("id").required(true)))
                .subcommand(
                    Command::new("users")
                        .arg(Arg::new("page").long("page").takes_value(true))
                        .arg(
                            Arg::new("role")
                                .long("role")
                                .takes_value(true)
                                .possible_values(["user", "admin"]),
                        ),
                )
                .subcommand(
                    Command::new("set-role")
                        .arg(Arg::new("id").required(true))
                        .arg(
                            Arg::new("role")
                                .required(true)
                                .possible_values(["user", "admin"]),
                        ),
                )
                .subcommand(Command::new("delete-user").arg(Arg::new("id").required(true))),
        )
}

#[inline]
pub fn extract_arg<'a>(ams: &'a ArgMatches, name: &str) -> Result<&'a str> {
    match ams.value_of(name) {
        Some(s) => Ok(s),
        None => bail!("cannot get arg: {}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() { create_cli().debug_assert(); }

    #[test]
    fn parses_course_listing() {
        let m = create_cli()
            .try_get_matches_from(vec!["courses", "--price", "asc", "--page", "2"])
            .unwrap();

        let sub = m.subcommand_matches("courses").unwrap();
        assert_eq!(sub.value_of("price"), Some("asc"));
        assert_eq!(sub.value_of("page"), Some("2"));
    }

    #[test]
    fn rejects_unknown_price_order() {
        assert!(create_cli()
            .try_get_matches_from(vec!["courses", "--price", "sideways"])
            .is_err());
    }
}
