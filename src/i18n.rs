use std::collections::HashMap;

use crate::entities::Lang;

/// Entries are (namespace, key) -> [en, ar].  Namespaces mirror the UI
/// surfaces the strings belong to.
type Table = HashMap<(&'static str, &'static str), [&'static str; 2]>;

macro_rules! table {
    ($( $ns:literal / $key:literal => $en:literal, $ar:literal; )*) => {{
        let mut t = Table::new();
        $( t.insert(($ns, $key), [$en, $ar]); )*
        t
    }};
}

lazy_static::lazy_static! {
    static ref TABLE: Table = table! {
        "snackbar"/"favorite_added" => "{title} has been added to your favorites", "تمت إضافة {title} إلى مفضلاتك";
        "snackbar"/"favorite_removed" => "{title} has been removed from your favorites", "تمت إزالة {title} من مفضلاتك";
        "snackbar"/"course_joined" => "You have joined {title}!", "لقد انضممت إلى {title}!";
        "snackbar"/"course_unjoined" => "You have unjoined {title}.", "لقد غادرت {title}.";
        "snackbar"/"course_created" => "Course added successfully", "تمت إضافة الدورة بنجاح";
        "snackbar"/"course_updated" => "Course updated successfully", "تم تحديث الدورة بنجاح";
        "snackbar"/"course_deleted" => "Course deleted successfully", "تم حذف الدورة بنجاح";
        "snackbar"/"no_changes" => "No changes were made", "لم يتم إجراء أي تغييرات";
        "snackbar"/"operation_failed" => "Something went wrong. Please try again.", "حدث خطأ ما. يرجى المحاولة مرة أخرى.";
        "snackbar"/"role_updated" => "User role updated", "تم تحديث دور المستخدم";
        "snackbar"/"user_deleted" => "User deleted", "تم حذف المستخدم";

        "confirm"/"remove_favorite" => "Are you sure you want to remove {title} from your favorites?", "هل أنت متأكد أنك تريد إزالة {title} من مفضلاتك؟";
        "confirm"/"unjoin_course" => "Are you sure you want to unjoin {title}?", "هل أنت متأكد أنك تريد مغادرة {title}؟";
        "confirm"/"delete_course" => "Are you sure you want to delete {title}?", "هل أنت متأكد أنك تريد حذف {title}؟";
        "confirm"/"delete_user" => "Are you sure you want to delete this user?", "هل أنت متأكد أنك تريد حذف هذا المستخدم؟";

        "dialog"/"admin_delete_blocked" => "Admin accounts cannot be deleted", "لا يمكن حذف حسابات المسؤولين";
        "dialog"/"admin_demote_blocked" => "Admins cannot be changed back to users", "لا يمكن إعادة المسؤولين إلى مستخدمين";

        "auth"/"required" => "Please sign in to continue", "يرجى تسجيل الدخول للمتابعة";
        "auth"/"invalid_credentials" => "Wrong email or password", "البريد الإلكتروني أو كلمة المرور غير صحيحة";
        "auth"/"unknown_account" => "No account found for this email", "لا يوجد حساب لهذا البريد الإلكتروني";
        "auth"/"email_taken" => "This email is already registered", "هذا البريد الإلكتروني مسجل بالفعل";
        "auth"/"signed_out" => "You have been signed out", "لقد تم تسجيل خروجك";

        "validation"/"title_required" => "Title is required in both languages", "العنوان مطلوب باللغتين";
        "validation"/"description_required" => "Description is required in both languages", "الوصف مطلوب باللغتين";
        "validation"/"creator_required" => "Creator is required in both languages", "اسم المنشئ مطلوب باللغتين";
        "validation"/"image_url_invalid" => "Image must be a valid http(s) URL", "يجب أن تكون الصورة رابط http(s) صالح";
        "validation"/"price_invalid" => "Price must be a positive number", "يجب أن يكون السعر رقمًا موجبًا";
        "validation"/"category_required" => "Category is required in both languages", "التصنيف مطلوب باللغتين";

        "catalog"/"no_results" => "No courses found", "لم يتم العثور على دورات";
        "catalog"/"not_found" => "Course not found", "الدورة غير موجودة";
        "catalog"/"no_favorites" => "No favorite courses yet.", "لا توجد دورات مفضلة بعد.";
        "catalog"/"no_joined" => "You have not joined any courses yet.", "لم تنضم إلى أي دورة بعد.";
    };
}

fn index(lang: Lang) -> usize {
    match lang {
        Lang::En => 0,
        Lang::Ar => 1,
    }
}

/// Unknown keys resolve to `namespace.key` instead of panicking.
pub fn tr(lang: Lang, ns: &str, key: &str) -> String {
    match TABLE.get(&(ns, key)) {
        Some(variants) => variants[index(lang)].to_string(),
        None => format!("{}.{}", ns, key),
    }
}

/// `tr` plus `{placeholder}` substitution.
pub fn tr_with(lang: Lang, ns: &str, key: &str, substitutions: &[(&str, &str)]) -> String {
    let mut msg = tr(lang, ns, key);
    for (placeholder, value) in substitutions {
        msg = msg.replace(&format!("{{{}}}", placeholder), value);
    }

    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_both_languages() {
        assert_eq!(tr(Lang::En, "catalog", "no_results"), "No courses found");
        assert_eq!(tr(Lang::Ar, "catalog", "no_results"), "لم يتم العثور على دورات");
    }

    #[test]
    fn unknown_key_echoes_path() {
        assert_eq!(tr(Lang::En, "nope", "missing"), "nope.missing");
    }

    #[test]
    fn placeholder_substitution() {
        let msg = tr_with(
            Lang::En,
            "snackbar",
            "favorite_added",
            &[("title", "Intro to X")],
        );
        assert_eq!(msg, "Intro to X has been added to your favorites");
    }
}
